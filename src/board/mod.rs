mod animation;
mod interaction;
mod paint;
mod render;

use bevy::prelude::*;

use crate::resources::Position;

pub use animation::*;
pub use interaction::*;
pub use paint::*;
pub use render::*;

/*
* Board geometry lives in canvas units: a 600x600 square with the origin at the
* top-left corner and y growing downwards. Each cell is 200 units wide and a
* mark occupies a 160 unit box inset by 20 units.
*/
pub const CANVAS_SIZE: f32 = 600.;
pub const CELL_STRIDE: f32 = 200.;
pub const CELL_MARGIN: f32 = 20.;
pub const MARK_SIZE: f32 = 160.;

/// Tags every entity drawn for a single board position.
#[derive(Component, Deref, Clone, Copy, Debug)]
pub struct CellElement(pub Position);

/// Invisible click target sitting on an empty cell.
#[derive(Component)]
pub struct Blank;

#[derive(Component, Clone, Copy, Debug)]
pub struct GridLine {
    pub start: Vec2,
    pub end: Vec2,
}

/// A player clicked the blank of a cell.
#[derive(Event, Clone, Copy, Debug)]
pub struct CellActivated(pub Position);

/// The canvas box a mark at `position` is drawn in.
pub fn mark_bounds(position: Position) -> Rect {
    let min = Vec2::new(
        CELL_MARGIN + CELL_STRIDE * position.column() as f32,
        CELL_MARGIN + CELL_STRIDE * position.row() as f32,
    );
    Rect::from_corners(min, min + Vec2::splat(MARK_SIZE))
}

/// Maps canvas units onto world space, centred on the origin with y up.
pub fn canvas_to_world(point: Vec2) -> Vec2 {
    Vec2::new(point.x - CANVAS_SIZE / 2., CANVAS_SIZE / 2. - point.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_bounds_follow_row_major_layout() {
        let centre = mark_bounds(Position::new(4).unwrap());
        assert_eq!(centre.min, Vec2::new(220., 220.));
        assert_eq!(centre.max, Vec2::new(380., 380.));

        let last = mark_bounds(Position::new(8).unwrap());
        assert_eq!(last.min, Vec2::new(420., 420.));

        let top_right = mark_bounds(Position::new(2).unwrap());
        assert_eq!(top_right.min, Vec2::new(420., 20.));
    }

    #[test]
    fn canvas_corners_map_to_world() {
        assert_eq!(canvas_to_world(Vec2::ZERO), Vec2::new(-300., 300.));
        assert_eq!(canvas_to_world(Vec2::splat(CANVAS_SIZE)), Vec2::new(300., -300.));
    }
}
