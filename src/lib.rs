pub mod board;
#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
pub mod network;
pub mod resources;
pub mod ui;

use std::sync::Arc;

use bevy::prelude::*;

use board::{CANVAS_SIZE, CellActivated, GridGizmos, MarkGizmos, WinLineGizmos};
use network::{NetworkEvent, ServerReply, Transport};
use resources::{BoardSettings, CellElements, GameSession, GameState};

/// On-screen pixels per canvas unit.
pub const BOARD_SCALE: f32 = 0.5;
/// Room below the board for the play-again button, in pixels.
const BOTTOM_MARGIN: f32 = 40.;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoardState {
    #[default]
    Setup,
    AwaitingInput,
    AwaitingResponse,
    Terminal,
}

/// Board state, move protocol and reconciliation. Runs without a window.
pub struct BoardViewPlugin {
    seed: GameState,
    settings: BoardSettings,
    transport: Arc<dyn Transport>,
}

impl BoardViewPlugin {
    pub fn new(seed: GameState, settings: BoardSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            seed,
            settings,
            transport,
        }
    }
}

impl Plugin for BoardViewPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GameSession::new(self.seed.clone()));
        app.insert_resource(self.settings.clone());
        app.init_resource::<CellElements>();
        app.add_event::<CellActivated>();
        app.init_state::<BoardState>();
        network::setup_transport(app, self.transport.clone());

        app.add_systems(OnEnter(BoardState::Setup), board::init_board);
        for entered in [BoardState::AwaitingInput, BoardState::Terminal] {
            app.add_systems(
                OnTransition {
                    exited: BoardState::Setup,
                    entered,
                },
                ui::announce_game,
            );
        }

        app.add_systems(
            Update,
            board::activate_cell.run_if(on_event::<CellActivated>),
        );
        app.add_systems(
            Update,
            (
                network::dispatch_pending_move,
                network::reconcile_move.run_if(on_event::<NetworkEvent<ServerReply>>),
            )
                .chain()
                .run_if(in_state(BoardState::AwaitingResponse)),
        );
        app.add_systems(
            Update,
            (
                ui::play_again_interaction,
                network::reconcile_new_game.run_if(on_event::<NetworkEvent<ServerReply>>),
            )
                .run_if(in_state(BoardState::Terminal)),
        );
        app.add_systems(OnExit(BoardState::Terminal), board::clear_board);

        app.add_systems(Update, board::advance_drawings);
    }
}

/// Camera, gizmo painting and the status bar.
pub struct BoardRenderPlugin;

impl Plugin for BoardRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_gizmo_group::<GridGizmos>();
        app.init_gizmo_group::<MarkGizmos>();
        app.init_gizmo_group::<WinLineGizmos>();

        app.add_systems(
            Startup,
            (spawn_camera, board::configure_gizmos, ui::spawn_status_bar),
        );
        app.add_systems(
            Update,
            (
                board::paint_grid,
                board::paint_marks,
                board::paint_win_lines,
            ),
        );
    }
}

/// Window size that fits the board plus the status bar and button row.
pub fn window_size() -> Vec2 {
    let board = CANVAS_SIZE * BOARD_SCALE;
    Vec2::new(board + 20., board + ui::TOP_BAR_HEIGHT + BOTTOM_MARGIN)
}

fn spawn_camera(mut cmds: Commands) {
    // Shift the view so the board sits between the top bar and the bottom row.
    let offset = (ui::TOP_BAR_HEIGHT - BOTTOM_MARGIN) / 2. / BOARD_SCALE;
    cmds.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1. / BOARD_SCALE,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0., offset, 1.),
    ));
}
