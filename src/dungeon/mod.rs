//! Dungeon content pipeline
//!
//! Definition files are loaded by the store, held by the catalog and turned
//! into playable grids by the generator.

pub mod catalog;
pub mod definition;
pub mod error;
pub mod example;
pub mod generator;
pub mod store;

pub use catalog::Catalog;
pub use definition::{
    ActionKind, DungeonDefinition, EncounterSpawn, EventAction, EventDefinition, ItemEffect, ItemSpawn, ItemTemplate,
    LevelDefinition, MonsterTemplate, Position, RoomDefinition,
};
pub use error::{DungeonError, Result};
pub use example::create_example;
pub use generator::{generate, generate_with_thread_rng, Grid, LevelMetadata, PlacedItem, PlacedMonster};
