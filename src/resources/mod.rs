mod cell_elements;
mod game_state;
mod settings;

pub use cell_elements::*;
pub use game_state::*;
pub use settings::*;
