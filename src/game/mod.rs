//! Game module - live run state and turn rules

mod level;
mod state;
mod turn;

pub use level::{GroundItem, Level, Monster};
pub use state::{Game, GameMessage, GameState, MessageCategory, Player};
