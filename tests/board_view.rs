use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use crossbeam_channel::Sender;

use board_view::board::{Blank, BoardPainter, CellActivated, CellElement, Glyph, GridLine, WinLine};
use board_view::network::{
    OutboundRequest, RequestKind, ServerReply, Transport, TransportError,
};
use board_view::resources::{
    Board, BoardSettings, CellElements, GameSession, GameState, Mark, Player, Position, Winner,
};
use board_view::ui::{PlayAgainButton, StatusText, UiButtonStyle};
use board_view::{BoardState, BoardViewPlugin};

const FRAME: Duration = Duration::from_millis(100);
const MOVE_DELAY: Duration = Duration::from_millis(300);

/// Holds on to every request so the test decides when and how it is answered.
#[derive(Clone, Default)]
struct FakeServer {
    inbox: Arc<Mutex<Vec<(OutboundRequest, Sender<ServerReply>)>>>,
}

impl Transport for FakeServer {
    fn submit(&self, request: OutboundRequest, replies: Sender<ServerReply>) {
        self.inbox.lock().unwrap().push((request, replies));
    }
}

impl FakeServer {
    fn requests(&self) -> Vec<OutboundRequest> {
        self.inbox
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    fn answer(&self, result: Result<GameState, TransportError>) {
        let (request, replies) = self.inbox.lock().unwrap().remove(0);
        replies.send(ServerReply { request, result }).unwrap();
    }
}

fn pos(i: u8) -> Position {
    Position::new(i).unwrap()
}

fn board(cells: [u8; 9]) -> Board {
    Board(cells.map(|c| match c {
        1 => Mark::X,
        2 => Mark::O,
        _ => Mark::Empty,
    }))
}

fn settings(new_game_url: Option<&str>) -> BoardSettings {
    BoardSettings {
        new_game_url: new_game_url.map(str::to_string),
        move_delay: MOVE_DELAY,
        ..default()
    }
}

fn build_app(seed: GameState, settings: BoardSettings, server: &FakeServer, status: bool) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.add_plugins(BoardViewPlugin::new(seed, settings, Arc::new(server.clone())));
    if status {
        app.world_mut().spawn((StatusText, Text::new("")));
    }
    app.update();
    app
}

fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<Entity, F>()
        .iter(app.world())
        .count()
}

fn elements_at(app: &mut App, position: Position) -> usize {
    app.world_mut()
        .query::<&CellElement>()
        .iter(app.world())
        .filter(|cell| cell.0 == position)
        .count()
}

fn state(app: &App) -> BoardState {
    app.world().resource::<State<BoardState>>().get().clone()
}

fn status_text(app: &mut App) -> String {
    app.world_mut()
        .query_filtered::<&Text, With<StatusText>>()
        .single(app.world())
        .unwrap()
        .0
        .clone()
}

fn element(app: &App, position: Position) -> Entity {
    app.world().resource::<CellElements>().get(position).unwrap()
}

/// X took the top row; the human played X against an O server.
fn decided_seed() -> GameState {
    let mut seed = GameState::new(Player::O, "/games/1/move");
    seed.board = board([1, 1, 1, 2, 2, 1, 2, 1, 2]);
    seed.winner = Winner::X;
    seed.winning_positions = vec![[pos(0), pos(1), pos(2)]];
    seed
}

/// The server played X in the corner and waits for the human's O.
fn opened_seed() -> GameState {
    let mut seed = GameState::new(Player::X, "/games/2/move");
    seed.board = board([1, 0, 0, 0, 0, 0, 0, 0, 0]);
    seed
}

/// Activates `position` and runs frames until the move went out.
fn play(app: &mut App, server: &FakeServer, position: Position) {
    app.world_mut().send_event(CellActivated(position));
    for _ in 0..10 {
        app.update();
        if !server.requests().is_empty() {
            return;
        }
    }
    panic!("move at {position} was never sent");
}

#[test]
fn empty_seed_draws_grid_and_blanks() {
    let server = FakeServer::default();
    let mut app = build_app(
        GameState::new(Player::O, "/m"),
        settings(None),
        &server,
        true,
    );

    assert_eq!(count::<With<Blank>>(&mut app), 9);
    assert_eq!(count::<With<GridLine>>(&mut app), 4);
    assert_eq!(count::<With<WinLine>>(&mut app), 0);
    assert_eq!(state(&app), BoardState::AwaitingInput);
    assert_eq!(status_text(&mut app), "Your turn.");
}

#[test]
fn decided_seed_shows_marks_and_win_line() {
    let server = FakeServer::default();
    let mut app = build_app(decided_seed(), settings(None), &server, true);

    assert_eq!(count::<With<Glyph>>(&mut app), 9);
    assert_eq!(count::<With<Blank>>(&mut app), 0);
    assert_eq!(count::<With<WinLine>>(&mut app), 1);
    assert_eq!(state(&app), BoardState::Terminal);
    assert_eq!(status_text(&mut app), "You win!");

    let win_line = app
        .world_mut()
        .query::<&WinLine>()
        .single(app.world())
        .unwrap();
    assert!(win_line.progress.is_done());
}

#[derive(Resource)]
struct Brush(Position, Mark);

fn draw_with_brush(brush: Res<Brush>, mut painter: BoardPainter) {
    painter.draw_mark(brush.0, brush.1, false);
}

#[test]
fn redrawing_a_cell_keeps_one_element() {
    let server = FakeServer::default();
    let mut app = build_app(
        GameState::new(Player::O, "/m"),
        settings(None),
        &server,
        true,
    );

    for position in Position::all() {
        for mark in [Mark::Empty, Mark::X, Mark::O] {
            app.insert_resource(Brush(position, mark));
            app.world_mut().run_system_once(draw_with_brush).unwrap();
            assert_eq!(elements_at(&mut app, position), 1, "{mark:?} at {position}");
            assert_eq!(
                app.world().resource::<CellElements>().mark(position),
                Some(mark)
            );
        }
        let glyph = app.world().get::<Glyph>(element(&app, position)).unwrap();
        assert_eq!(glyph.mark(), Mark::O);
    }
    assert_eq!(count::<With<Blank>>(&mut app), 0);
    assert_eq!(count::<With<Glyph>>(&mut app), 9);
}

#[test]
fn move_is_shown_at_once_and_sent_after_delay() {
    let server = FakeServer::default();
    let mut app = build_app(opened_seed(), settings(None), &server, true);

    app.world_mut().send_event(CellActivated(pos(4)));
    app.update();

    assert_eq!(app.world().resource::<GameSession>().board[pos(4)], Mark::O);
    let entity = element(&app, pos(4));
    assert_eq!(app.world().get::<Glyph>(entity).unwrap().mark(), Mark::O);
    assert_eq!(status_text(&mut app), "Hmmm....");
    assert!(server.requests().is_empty());

    // Two frames in, the delay has not run out yet.
    app.update();
    app.update();
    assert!(server.requests().is_empty());

    for _ in 0..3 {
        app.update();
    }
    assert_eq!(
        server.requests(),
        vec![OutboundRequest::mark("/games/2/move", pos(4))]
    );
    assert_eq!(state(&app), BoardState::AwaitingResponse);
}

#[test]
fn reply_redraws_only_changed_cells() {
    let server = FakeServer::default();
    let mut app = build_app(opened_seed(), settings(None), &server, true);
    play(&mut app, &server, pos(4));

    let before: Vec<Entity> = Position::all().map(|p| element(&app, p)).collect();

    let mut reply = opened_seed();
    reply.board = board([1, 0, 0, 0, 2, 1, 0, 0, 0]);
    server.answer(Ok(reply));
    app.update();
    app.update();

    for p in Position::all() {
        let now = element(&app, p);
        if p == pos(5) {
            assert_ne!(now, before[p.index()]);
        } else {
            assert_eq!(now, before[p.index()], "cell {p} was redrawn");
        }
    }
    let glyph = app.world().get::<Glyph>(element(&app, pos(5))).unwrap();
    assert_eq!(glyph.mark(), Mark::X);
    assert_eq!(state(&app), BoardState::AwaitingInput);
    assert_eq!(status_text(&mut app), "Your turn.");
    assert_eq!(
        app.world().resource::<GameSession>().board.state(),
        board([1, 0, 0, 0, 2, 1, 0, 0, 0]).state()
    );
}

#[test]
fn failed_reply_takes_the_mark_back() {
    let server = FakeServer::default();
    let mut app = build_app(opened_seed(), settings(None), &server, true);
    play(&mut app, &server, pos(4));

    server.answer(Err(TransportError::Status(500)));
    app.update();
    app.update();

    let entity = element(&app, pos(4));
    assert!(app.world().get::<Blank>(entity).is_some());
    assert_eq!(
        app.world().resource::<GameSession>().board[pos(4)],
        Mark::Empty
    );
    assert_eq!(status_text(&mut app), "Couldn't reach the server. Try again.");
    assert_eq!(state(&app), BoardState::AwaitingInput);
}

#[test]
fn winning_reply_ends_the_game() {
    let server = FakeServer::default();
    let mut seed = opened_seed();
    seed.board = board([1, 2, 0, 0, 1, 0, 2, 0, 0]);
    let mut app = build_app(seed, settings(None), &server, true);
    play(&mut app, &server, pos(5));

    let mut reply = opened_seed();
    reply.board = board([1, 2, 0, 0, 1, 2, 2, 0, 1]);
    reply.winner = Winner::X;
    reply.winning_positions = vec![[pos(0), pos(4), pos(8)]];
    server.answer(Ok(reply));
    app.update();
    app.update();

    assert_eq!(state(&app), BoardState::Terminal);
    assert_eq!(status_text(&mut app), "I win!");
    assert_eq!(count::<With<WinLine>>(&mut app), 1);
    assert_eq!(count::<With<Blank>>(&mut app), 0);

    // Drawn animated: still waiting out its delay.
    let win_line = app
        .world_mut()
        .query::<&WinLine>()
        .single(app.world())
        .unwrap();
    assert!(!win_line.progress.is_done());
}

#[test]
fn closed_cells_are_not_played() {
    let server = FakeServer::default();
    let mut seed = opened_seed();
    seed.next_moves = Some(vec![pos(1), pos(2)]);
    let mut app = build_app(seed.clone(), settings(None), &server, true);
    let corner = element(&app, pos(0));

    // Taken by the server, then open but not offered.
    for position in [pos(0), pos(5)] {
        app.world_mut().send_event(CellActivated(position));
        app.update();
    }
    for _ in 0..5 {
        app.update();
    }

    assert_eq!(app.world().resource::<GameSession>().board, seed.board);
    assert_eq!(element(&app, pos(0)), corner);
    assert!(app.world().get::<Blank>(element(&app, pos(5))).is_some());
    assert!(server.requests().is_empty());
    assert_eq!(state(&app), BoardState::AwaitingInput);
    assert_eq!(status_text(&mut app), "Your turn.");
}

#[test]
fn activations_are_ignored_while_waiting() {
    let server = FakeServer::default();
    let mut app = build_app(opened_seed(), settings(None), &server, true);
    play(&mut app, &server, pos(4));

    app.world_mut().send_event(CellActivated(pos(2)));
    app.update();
    assert_eq!(
        app.world().resource::<GameSession>().board[pos(2)],
        Mark::Empty
    );
    assert_eq!(server.requests().len(), 1);

    let mut reply = opened_seed();
    reply.board = board([1, 0, 0, 0, 2, 1, 0, 0, 0]);
    server.answer(Ok(reply));
    app.update();
    app.update();

    assert_eq!(state(&app), BoardState::AwaitingInput);
    assert!(app.world().get::<Blank>(element(&app, pos(2))).is_some());
    assert!(server.requests().is_empty());
}

#[test]
fn missing_status_text_is_tolerated() {
    let server = FakeServer::default();
    let mut app = build_app(opened_seed(), settings(None), &server, false);
    play(&mut app, &server, pos(4));

    server.answer(Err(TransportError::Status(503)));
    app.update();
    app.update();

    assert_eq!(state(&app), BoardState::AwaitingInput);
}

fn spawn_play_again_button(app: &mut App) -> Entity {
    let style = UiButtonStyle {
        color: Color::BLACK,
        border_color: Color::BLACK,
        text_color: Color::WHITE,
    };
    let button = app
        .world_mut()
        .spawn((
            PlayAgainButton,
            style,
            Interaction::None,
            BackgroundColor(style.color),
            BorderColor(style.border_color),
            Node::default(),
        ))
        .id();
    app.update();
    button
}

fn press(app: &mut App, button: Entity) {
    *app.world_mut().get_mut::<Interaction>(button).unwrap() = Interaction::Pressed;
    app.update();
}

#[test]
fn play_again_without_endpoint_explains_itself() {
    let server = FakeServer::default();
    let mut app = build_app(decided_seed(), settings(None), &server, true);
    let button = spawn_play_again_button(&mut app);

    press(&mut app, button);

    assert!(server.requests().is_empty());
    assert_eq!(status_text(&mut app), "No new game endpoint configured.");
    assert_eq!(state(&app), BoardState::Terminal);
}

#[test]
fn failed_new_game_keeps_the_finished_board() {
    let server = FakeServer::default();
    let mut app = build_app(decided_seed(), settings(Some("/games")), &server, true);
    let button = spawn_play_again_button(&mut app);

    press(&mut app, button);
    server.answer(Err(TransportError::Status(500)));
    app.update();
    app.update();

    assert_eq!(status_text(&mut app), "Couldn't start a new game.");
    assert_eq!(state(&app), BoardState::Terminal);
    assert_eq!(count::<With<WinLine>>(&mut app), 1);
    assert_eq!(count::<With<Glyph>>(&mut app), 9);
}

#[test]
fn play_again_starts_a_fresh_board() {
    let server = FakeServer::default();
    let mut app = build_app(decided_seed(), settings(Some("/games")), &server, true);
    let button = spawn_play_again_button(&mut app);

    press(&mut app, button);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].kind,
        RequestKind::NewGame {
            server_player: Player::X
        }
    );
    assert_eq!(status_text(&mut app), "Setting up a new game...");

    // Freshly created games only say where they live.
    let mut fresh = GameState::new(Player::X, "");
    fresh.url = Some("http://testserver/games/3/".into());
    fresh.board = board([0, 0, 0, 0, 1, 0, 0, 0, 0]);
    server.answer(Ok(fresh));
    for _ in 0..3 {
        app.update();
    }

    assert_eq!(state(&app), BoardState::AwaitingInput);
    assert_eq!(count::<With<WinLine>>(&mut app), 0);
    assert_eq!(count::<With<GridLine>>(&mut app), 4);
    assert_eq!(count::<With<Blank>>(&mut app), 8);
    assert_eq!(count::<With<Glyph>>(&mut app), 1);
    assert_eq!(status_text(&mut app), "Your turn.");
    assert_eq!(
        app.world().get::<Node>(button).unwrap().display,
        Display::None
    );
    assert_eq!(
        app.world().resource::<GameSession>().move_url,
        "http://testserver/games/3/move/"
    );
}
