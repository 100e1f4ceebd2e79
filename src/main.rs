use std::sync::Arc;

use bevy::log::{self, LogPlugin};
use bevy::prelude::*;
use bevy::window::WindowResolution;

use board_view::network::HttpTransport;
use board_view::resources::{BoardSettings, GameState};
use board_view::{BoardRenderPlugin, BoardViewPlugin};

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = board_view::cli::Cli::parse();
    let settings = cli.settings();
    let seed = cli.load_seed()?;
    run(seed, settings)
}

#[cfg(target_arch = "wasm32")]
fn main() -> anyhow::Result<()> {
    let settings = BoardSettings::default();
    let seed = match option_env!("TTT_SEED_JSON") {
        Some(json) => GameState::from_json(json)?,
        None => GameState::new(board_view::resources::Player::O, "move"),
    };
    run(seed, settings)
}

fn run(seed: GameState, settings: BoardSettings) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&settings)?;
    let size = board_view::window_size();

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Tic-Tac-Toe".into(),
                    resolution: WindowResolution::new(size.x, size.y),
                    resizable: false,
                    ..default()
                }),
                close_when_requested: true,
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu_core=warn,wgpu_hal=warn,board_view=debug".into(),
                level: log::Level::WARN,
                ..default()
            }),
    )
    .insert_resource(ClearColor(Color::BLACK.with_alpha(0.975)))
    .add_plugins((
        BoardViewPlugin::new(seed, settings, Arc::new(transport)),
        BoardRenderPlugin,
    ));

    app.run();
    Ok(())
}
