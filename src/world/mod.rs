//! World module
//!
//! Tile alphabet and procedural generation.

pub mod tile;
pub mod generation;

pub use tile::{parse_hex_color, TileType};
