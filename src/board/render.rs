use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::BoardState;
use crate::resources::{CellElements, GameSession, Mark, Position};
use crate::ui::StatusView;

use super::{
    CANVAS_SIZE, CELL_STRIDE, CellElement, DrawProgress, Glyph, GridLine, Stroke, WIN_LINE_DELAY,
    WIN_LINE_DURATION, WinLine, interaction, mark_bounds,
};

const WIN_LINE_OVERSHOOT: f32 = 50.;

const GRID_LINES: [(Vec2, Vec2); 4] = [
    (Vec2::new(CELL_STRIDE, 0.), Vec2::new(CELL_STRIDE, CANVAS_SIZE)),
    (Vec2::new(CELL_STRIDE * 2., 0.), Vec2::new(CELL_STRIDE * 2., CANVAS_SIZE)),
    (Vec2::new(0., CELL_STRIDE), Vec2::new(CANVAS_SIZE, CELL_STRIDE)),
    (Vec2::new(0., CELL_STRIDE * 2.), Vec2::new(CANVAS_SIZE, CELL_STRIDE * 2.)),
];

/// Spawns and replaces the entities that make up the board picture.
#[derive(SystemParam)]
pub struct BoardPainter<'w, 's> {
    cmds: Commands<'w, 's>,
    elements: ResMut<'w, CellElements>,
}

impl<'w, 's> BoardPainter<'w, 's> {
    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.cmds
    }

    pub fn draw_grid(&mut self) {
        for (start, end) in GRID_LINES {
            self.cmds.spawn(GridLine { start, end });
        }
    }

    /// Replaces whatever is drawn at `position` with `mark`.
    pub fn draw_mark(&mut self, position: Position, mark: Mark, fast: bool) {
        let bounds = mark_bounds(position);
        let entity = match mark {
            Mark::Empty => interaction::spawn_blank(&mut self.cmds, position, bounds),
            Mark::X => self
                .cmds
                .spawn((CellElement(position), Glyph::cross(bounds, fast)))
                .id(),
            Mark::O => self
                .cmds
                .spawn((CellElement(position), Glyph::ring(bounds, fast)))
                .id(),
        };

        if let Some(previous) = self.elements.replace(position, entity, mark) {
            self.cmds.entity(previous).despawn();
        }
    }

    /// Draws one line through every winning triple, then takes the blanks
    /// away so no further move can be made.
    pub fn draw_win_lines(&mut self, winning_positions: &[[Position; 3]], fast: bool) {
        for &triple in winning_positions {
            let (from, to) = win_line_endpoints(triple);
            self.cmds.spawn(WinLine(Stroke {
                from,
                to,
                progress: DrawProgress::new(fast, WIN_LINE_DELAY, WIN_LINE_DURATION),
            }));
        }
        self.strip_blanks();
    }

    pub fn strip_blanks(&mut self) {
        for blank in self.elements.take_blanks() {
            self.cmds.entity(blank).despawn();
        }
    }
}

/// The line runs from just outside the first cell's mark to just outside the
/// third one's, pushed away from the middle of the triple.
pub fn win_line_endpoints([first, _, last]: [Position; 3]) -> (Vec2, Vec2) {
    let p1 = Vec2::new(first.column() as f32, first.row() as f32);
    let p2 = Vec2::new(last.column() as f32, last.row() as f32);
    let start = Vec2::new(85., 110.) + WIN_LINE_OVERSHOOT * (p1 - p2) + CELL_STRIDE * p1;
    let end = Vec2::new(95., 90.) + WIN_LINE_OVERSHOOT * (p2 - p1) + CELL_STRIDE * p2;
    (start, end)
}

pub fn init_board(
    mut painter: BoardPainter,
    session: Res<GameSession>,
    mut game_state: ResMut<NextState<BoardState>>,
) {
    debug!(
        "Drawing board state {}:\n{}",
        session.board.state(),
        session.board
    );
    painter.draw_grid();
    for position in Position::all() {
        painter.draw_mark(position, session.board[position], true);
    }

    if session.winner.is_decided() {
        painter.draw_win_lines(&session.winning_positions, true);
        game_state.set(BoardState::Terminal);
    } else {
        game_state.set(BoardState::AwaitingInput);
    }
}

pub fn clear_board(
    mut cmds: Commands,
    drawn: Query<Entity, Or<(With<CellElement>, With<GridLine>, With<WinLine>)>>,
    mut elements: ResMut<CellElements>,
    mut status: StatusView,
) {
    for entity in &drawn {
        cmds.entity(entity).despawn();
    }
    *elements = CellElements::default();
    status.hide_play_again();
}
