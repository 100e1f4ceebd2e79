use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::resources::Mark;

pub const STROKE_DURATION: f32 = 0.25;
pub const SECOND_STROKE_DELAY: f32 = 0.3;
pub const RING_DURATION: f32 = 0.5;
pub const RING_START_ANGLE: f32 = 0.1;
/// Win lines wait for any in-flight mark animation before growing.
pub const WIN_LINE_DELAY: f32 = 0.3;
pub const WIN_LINE_DURATION: f32 = 0.25;

/// How far a timed drawing has come, from nothing to fully drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawProgress {
    delay: f32,
    duration: f32,
    elapsed: f32,
}

impl DrawProgress {
    pub fn instant() -> Self {
        Self::animated(0., 0.)
    }

    pub fn animated(delay: f32, duration: f32) -> Self {
        Self {
            delay,
            duration,
            elapsed: 0.,
        }
    }

    pub fn new(fast: bool, delay: f32, duration: f32) -> Self {
        if fast {
            Self::instant()
        } else {
            Self::animated(delay, duration)
        }
    }

    pub fn tick(&mut self, delta: f32) {
        self.elapsed += delta;
    }

    pub fn fraction(&self) -> f32 {
        let running = self.elapsed - self.delay;
        if running < 0. {
            0.
        } else if self.duration <= 0. {
            1.
        } else {
            (running / self.duration).min(1.)
        }
    }

    pub fn is_done(&self) -> bool {
        self.fraction() >= 1.
    }
}

/// A straight segment that grows from `from` towards `to`.
#[derive(Clone, Copy, Debug)]
pub struct Stroke {
    pub from: Vec2,
    pub to: Vec2,
    pub progress: DrawProgress,
}

impl Stroke {
    pub fn tip(&self) -> Vec2 {
        self.from.lerp(self.to, self.progress.fraction())
    }
}

#[derive(Component, Clone, Copy, Debug)]
pub enum Glyph {
    Cross([Stroke; 2]),
    Ring {
        center: Vec2,
        radius: f32,
        sweep: DrawProgress,
    },
}

impl Glyph {
    /// Two diagonals; the second one starts once the first has been drawn.
    pub fn cross(bounds: Rect, fast: bool) -> Self {
        let (top_left, bottom_right) = (bounds.min, bounds.max);
        let top_right = Vec2::new(bounds.max.x, bounds.min.y);
        let bottom_left = Vec2::new(bounds.min.x, bounds.max.y);
        Glyph::Cross([
            Stroke {
                from: top_left,
                to: bottom_right,
                progress: DrawProgress::new(fast, 0., STROKE_DURATION),
            },
            Stroke {
                from: top_right,
                to: bottom_left,
                progress: DrawProgress::new(fast, SECOND_STROKE_DELAY, STROKE_DURATION),
            },
        ])
    }

    pub fn ring(bounds: Rect, fast: bool) -> Self {
        Glyph::Ring {
            center: bounds.center(),
            radius: bounds.half_size().x,
            sweep: DrawProgress::new(fast, 0., RING_DURATION),
        }
    }

    pub fn mark(&self) -> Mark {
        match self {
            Glyph::Cross(_) => Mark::X,
            Glyph::Ring { .. } => Mark::O,
        }
    }

    /// End angle of the ring's arc, sweeping a full turn.
    pub fn ring_angle(sweep: &DrawProgress) -> f32 {
        RING_START_ANGLE + (TAU - RING_START_ANGLE) * sweep.fraction()
    }

    pub fn is_done(&self) -> bool {
        match self {
            Glyph::Cross(strokes) => strokes.iter().all(|s| s.progress.is_done()),
            Glyph::Ring { sweep, .. } => sweep.is_done(),
        }
    }

    fn tick(&mut self, delta: f32) {
        match self {
            Glyph::Cross(strokes) => strokes.iter_mut().for_each(|s| s.progress.tick(delta)),
            Glyph::Ring { sweep, .. } => sweep.tick(delta),
        }
    }
}

#[derive(Component, Deref, DerefMut, Clone, Copy, Debug)]
pub struct WinLine(pub Stroke);

pub fn advance_drawings(
    time: Res<Time>,
    mut glyphs: Query<&mut Glyph>,
    mut win_lines: Query<&mut WinLine>,
) {
    let delta = time.delta_secs();
    for mut glyph in &mut glyphs {
        if !glyph.is_done() {
            glyph.tick(delta);
        }
    }
    for mut line in &mut win_lines {
        if !line.progress.is_done() {
            line.progress.tick(delta);
        }
    }
}
