use bevy::prelude::*;

use crate::BoardState;
use crate::board::BoardPainter;
use crate::network::{MoveClient, OutboundRequest, PendingNewGame};
use crate::resources::{BoardSettings, GameSession, GameState};

use super::{
    PlayAgainButton, StatusMessage, StatusText, StatusView, TopBar, UiButtonStyle, colors,
};

pub const TOP_BAR_HEIGHT: f32 = 60.;

pub fn spawn_status_bar(mut cmds: Commands) {
    cmds.spawn((
        TopBar,
        Node {
            width: Val::Percent(100.),
            height: Val::Px(TOP_BAR_HEIGHT),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        BoxShadow::new(
            colors::DODGER_BLUE.with_alpha(0.5).into(),
            Val::Px(0.),
            Val::Px(-2.),
            Val::Px(2.),
            Val::Px(10.0),
        ),
    ))
    .with_child((
        StatusText,
        Label,
        Text::new(""),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(colors::GOLD.into()),
    ));

    let play_again_style = UiButtonStyle {
        color: colors::GOLD.into(),
        border_color: colors::DEEP_PINK.into(),
        text_color: colors::DARK_VIOLET.into(),
    };
    cmds.spawn((
        PlayAgainButton,
        Button,
        play_again_style,
        Node {
            display: Display::None,
            position_type: PositionType::Absolute,
            bottom: Val::Px(6.),
            left: Val::Percent(25.),
            width: Val::Percent(50.),
            height: Val::Px(28.),
            border: UiRect::all(Val::Px(1.0)),
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        ZIndex(2),
        BorderRadius::all(Val::Px(10.0)),
        BorderColor(play_again_style.border_color),
        BackgroundColor(play_again_style.color),
    ))
    .with_child((
        Text::new("Play again"),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(play_again_style.text_color),
    ));
}

/// Writes the outcome of `game` to the status line. A finished game also
/// gets its win lines and loses its blanks. Returns the state the board
/// moves to.
pub fn update_status(
    game: &GameState,
    status: &mut StatusView,
    painter: &mut BoardPainter,
) -> BoardState {
    status.show_outcome(game);
    if game.winner.is_decided() {
        info!("Game over: {}", StatusMessage::outcome(game).as_ref());
        painter.draw_win_lines(&game.winning_positions, false);
        BoardState::Terminal
    } else {
        BoardState::AwaitingInput
    }
}

/// Status for a freshly drawn board, whose win lines were already drawn.
pub fn announce_game(session: Res<GameSession>, mut status: StatusView) {
    status.show_outcome(&session);
}

#[allow(clippy::type_complexity)]
pub fn play_again_interaction(
    mut cmds: Commands,
    mut interaction_query: Query<
        (
            &UiButtonStyle,
            &Interaction,
            &mut BackgroundColor,
            &mut BorderColor,
        ),
        (Changed<Interaction>, With<PlayAgainButton>),
    >,
    mut status: StatusView,
    session: Res<GameSession>,
    settings: Res<BoardSettings>,
    client: Res<MoveClient>,
    pending: Option<Res<PendingNewGame>>,
) {
    for (button, interaction, mut color, mut border_color) in &mut interaction_query {
        match *interaction {
            Interaction::Pressed => {
                *color = Color::WHITE.into();
                *border_color = BorderColor(button.text_color);

                if pending.is_some() {
                    continue;
                }
                let Some(new_game_url) = settings.new_game_url.clone() else {
                    status.show(StatusMessage::NewGameUnavailable);
                    continue;
                };
                // Swap who opens so the player alternates between X and O.
                let server_player = session.server_player.opponent();
                client.submit(OutboundRequest::new_game(new_game_url, server_player));
                cmds.insert_resource(PendingNewGame);
                status.show(StatusMessage::NewGamePending);
            }
            Interaction::Hovered => {
                *color = button.text_color.into();
                *border_color = BorderColor(Color::WHITE);
            }
            Interaction::None => {
                *color = button.color.into();
                *border_color = BorderColor(button.border_color);
            }
        }
    }
}
