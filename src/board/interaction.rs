use bevy::prelude::*;

use crate::BoardState;
use crate::network::PendingMove;
use crate::resources::{BoardSettings, GameSession, Position};
use crate::ui::{StatusMessage, StatusView, colors};

use super::{BoardPainter, Blank, CellActivated, CellElement, canvas_to_world};

const BLANK_IDLE: Color = Color::NONE;

pub(super) fn spawn_blank(cmds: &mut Commands, position: Position, bounds: Rect) -> Entity {
    let center = canvas_to_world(bounds.center());
    cmds.spawn((
        CellElement(position),
        Blank,
        Sprite::from_color(BLANK_IDLE, bounds.size()),
        Transform::from_translation(center.extend(0.)),
    ))
    .observe(on_blank_over)
    .observe(on_blank_out)
    .observe(on_blank_click)
    .id()
}

fn on_blank_over(over: Trigger<Pointer<Over>>, mut blanks: Query<&mut Sprite, With<Blank>>) {
    let Ok(mut sprite) = blanks.get_mut(over.target()) else {
        return;
    };
    sprite.color = colors::DODGER_BLUE.with_alpha(0.15).into();
}

fn on_blank_out(out: Trigger<Pointer<Out>>, mut blanks: Query<&mut Sprite, With<Blank>>) {
    let Ok(mut sprite) = blanks.get_mut(out.target()) else {
        return;
    };
    sprite.color = BLANK_IDLE;
}

fn on_blank_click(
    click: Trigger<Pointer<Click>>,
    blanks: Query<&CellElement, With<Blank>>,
    mut ev_activated: EventWriter<CellActivated>,
) {
    let Ok(cell) = blanks.get(click.target()) else {
        return;
    };
    ev_activated.write(CellActivated(**cell));
}

/// Places the player's mark right away and queues the move for the server.
/// Activations outside of [`BoardState::AwaitingInput`] are dropped.
pub fn activate_cell(
    state: Res<State<BoardState>>,
    mut ev_activated: EventReader<CellActivated>,
    mut painter: BoardPainter,
    mut session: ResMut<GameSession>,
    mut status: StatusView,
    settings: Res<BoardSettings>,
    mut game_state: ResMut<NextState<BoardState>>,
) {
    if *state.get() != BoardState::AwaitingInput {
        for CellActivated(position) in ev_activated.read() {
            debug!("Ignoring click on {position} while {:?}", state.get());
        }
        return;
    }
    let Some(&CellActivated(position)) = ev_activated.read().next() else {
        return;
    };
    // Only one move per round trip.
    ev_activated.clear();

    if !session.accepts_move(position) {
        warn!("Ignoring move at {position}: cell is not open");
        return;
    }

    let mark = session.human_player().mark();
    painter.draw_mark(position, mark, false);
    session.board[position] = mark;
    status.show(StatusMessage::Thinking);

    info!("Player marked {position} with {mark:?}");
    painter
        .commands()
        .insert_resource(PendingMove::new(position, settings.move_delay));
    game_state.set(BoardState::AwaitingResponse);
}
