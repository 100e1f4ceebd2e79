//! Command-line interface for the native board view.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use reqwest::Url;

use crate::resources::{BoardSettings, DEFAULT_BASE_URL, GameState, Player};

/// Tic-tac-toe board that plays against a remote game server
#[derive(Parser, Debug)]
#[command(name = "board-view")]
#[command(version)]
pub struct Cli {
    /// JSON game state to start from. Without one the board starts empty.
    #[arg(long, env = "TTT_SEED")]
    pub seed: Option<PathBuf>,

    /// Base the server's relative endpoints are resolved against
    #[arg(long, env = "TTT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Endpoint that creates a new game for "play again"
    #[arg(long, env = "TTT_NEW_GAME_URL")]
    pub new_game_url: Option<String>,

    /// Move endpoint used when no seed is given
    #[arg(long, default_value = "move")]
    pub move_url: String,

    /// Milliseconds between placing a mark and sending the move
    #[arg(long, default_value = "500")]
    pub move_delay_ms: u64,

    /// Seconds before a request to the server is given up on
    #[arg(long, default_value = "30")]
    pub request_timeout_secs: u64,
}

impl Cli {
    pub fn settings(&self) -> BoardSettings {
        BoardSettings {
            base_url: self.base_url.clone(),
            new_game_url: self.new_game_url.clone(),
            move_delay: Duration::from_millis(self.move_delay_ms),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Reads and validates the seed file, or builds an empty game where the
    /// server plays O.
    pub fn load_seed(&self) -> anyhow::Result<GameState> {
        let Some(path) = &self.seed else {
            return Ok(GameState::new(Player::O, self.move_url.clone()));
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed {}", path.display()))?;
        let seed = GameState::from_json(&json)
            .with_context(|| format!("parsing seed {}", path.display()))?;
        Ok(seed.or_move_url(&self.move_url))
    }
}
