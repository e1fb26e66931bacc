//! Dungeon pipeline errors

use std::path::PathBuf;

/// Errors raised while loading, saving or generating dungeons
#[derive(thiserror::Error, Debug)]
pub enum DungeonError {
    /// A definition file could not be decoded into the schema
    #[error("malformed dungeon definition {path}: {source}")]
    MalformedDefinition {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the filesystem failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A definition could not be encoded
    #[error("failed to serialize dungeon definition: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid level index {index} (dungeon has {levels} levels)")]
    InvalidLevelIndex { index: usize, levels: usize },

    #[error("no dungeon definitions found in {path}")]
    NoDefinitionsFound { path: PathBuf },

    #[error("no current dungeon selected")]
    NoCurrentDungeon,
}

impl DungeonError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, DungeonError>;
