//! Procedural map generation
//!
//! Random floors for depths that have no hand-authored level.

pub mod rooms;

pub use rooms::generate_level;
