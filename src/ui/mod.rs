pub mod colors;
mod systems;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::resources::{GameState, Winner};

pub use systems::*;

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct PlayAgainButton;

#[derive(Component, Clone, Copy)]
pub struct UiButtonStyle {
    pub color: Color,
    pub border_color: Color,
    pub text_color: Color,
}

#[derive(Component)]
struct TopBar;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusMessage {
    YourTurn,
    Thinking,
    Tie,
    ServerWins,
    PlayerWins,
    MoveFailed,
    NewGamePending,
    NewGameFailed,
    NewGameUnavailable,
}

impl StatusMessage {
    pub fn outcome(game: &GameState) -> Self {
        match game.winner {
            Winner::None => StatusMessage::YourTurn,
            Winner::Tie => StatusMessage::Tie,
            winner if winner == Winner::from(game.server_player) => StatusMessage::ServerWins,
            _ => StatusMessage::PlayerWins,
        }
    }
}

impl AsRef<str> for StatusMessage {
    fn as_ref(&self) -> &str {
        match self {
            StatusMessage::YourTurn => "Your turn.",
            StatusMessage::Thinking => "Hmmm....",
            StatusMessage::Tie => "It's a tie.  Let's play again!",
            StatusMessage::ServerWins => "I win!",
            StatusMessage::PlayerWins => "You win!",
            StatusMessage::MoveFailed => "Couldn't reach the server. Try again.",
            StatusMessage::NewGamePending => "Setting up a new game...",
            StatusMessage::NewGameFailed => "Couldn't start a new game.",
            StatusMessage::NewGameUnavailable => "No new game endpoint configured.",
        }
    }
}

/// The status line and the play-again control. Both are optional: when the
/// page has no such element the update is skipped.
#[derive(SystemParam)]
pub struct StatusView<'w, 's> {
    label: Query<'w, 's, &'static mut Text, With<StatusText>>,
    play_again: Query<'w, 's, &'static mut Node, With<PlayAgainButton>>,
}

impl StatusView<'_, '_> {
    pub fn show(&mut self, message: StatusMessage) {
        let Ok(mut label) = self.label.single_mut() else {
            debug!("No status text to show {message:?}");
            return;
        };
        label.0 = message.as_ref().to_string();
    }

    /// Shows how the game stands and offers a rematch once it is over.
    pub fn show_outcome(&mut self, game: &GameState) {
        self.show(StatusMessage::outcome(game));
        if game.winner.is_decided() {
            self.set_play_again(Display::Flex);
        }
    }

    pub fn hide_play_again(&mut self) {
        self.set_play_again(Display::None);
    }

    fn set_play_again(&mut self, display: Display) {
        for mut node in &mut self.play_again {
            node.display = display;
        }
    }
}
