pub use bevy::color::palettes::css::{DARK_VIOLET, DEEP_PINK, DODGER_BLUE, GOLD, RED};
