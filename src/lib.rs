//! CryptCrawl - A data-driven terminal dungeon crawler
//!
//! Dungeons are described by JSON definition files, turned into playable
//! grids by the generator and explored from a ratatui interface.

pub mod config;
pub mod dungeon;
pub mod game;
pub mod ui;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use dungeon::{Catalog, DungeonDefinition, DungeonError};
pub use game::{Game, GameState};
