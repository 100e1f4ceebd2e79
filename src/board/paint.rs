use bevy::prelude::*;

use crate::ui::colors;

use super::{Glyph, GridLine, WinLine, canvas_to_world};

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct GridGizmos;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct MarkGizmos;

#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct WinLineGizmos;

const RING_RESOLUTION: u32 = 64;

pub fn configure_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (grid, _) = config_store.config_mut::<GridGizmos>();
    grid.line.width = 5.;
    let (marks, _) = config_store.config_mut::<MarkGizmos>();
    marks.line.width = 5.;
    let (win_lines, _) = config_store.config_mut::<WinLineGizmos>();
    win_lines.line.width = 6.5;
}

pub fn paint_grid(mut gizmos: Gizmos<GridGizmos>, grid_lines: Query<&GridLine>) {
    for line in &grid_lines {
        gizmos.line_2d(
            canvas_to_world(line.start),
            canvas_to_world(line.end),
            Color::WHITE,
        );
    }
}

pub fn paint_marks(mut gizmos: Gizmos<MarkGizmos>, glyphs: Query<&Glyph>) {
    for glyph in &glyphs {
        match glyph {
            Glyph::Cross(strokes) => {
                for stroke in strokes.iter().filter(|s| s.progress.fraction() > 0.) {
                    gizmos.line_2d(
                        canvas_to_world(stroke.from),
                        canvas_to_world(stroke.tip()),
                        colors::GOLD,
                    );
                }
            }
            Glyph::Ring {
                center,
                radius,
                sweep,
            } => {
                let center = canvas_to_world(*center);
                if sweep.is_done() {
                    gizmos
                        .circle_2d(center, *radius, colors::DEEP_PINK)
                        .resolution(RING_RESOLUTION);
                } else {
                    // Arcs are centred on +Y; rotate so the sweep starts at the top
                    // and runs clockwise.
                    let angle = Glyph::ring_angle(sweep);
                    gizmos
                        .arc_2d(
                            Isometry2d::new(center, Rot2::radians(-angle / 2.)),
                            angle,
                            *radius,
                            colors::DEEP_PINK,
                        )
                        .resolution(RING_RESOLUTION);
                }
            }
        }
    }
}

pub fn paint_win_lines(mut gizmos: Gizmos<WinLineGizmos>, win_lines: Query<&WinLine>) {
    for line in &win_lines {
        if line.progress.fraction() > 0. {
            gizmos.line_2d(
                canvas_to_world(line.from),
                canvas_to_world(line.tip()),
                colors::RED,
            );
        }
    }
}
