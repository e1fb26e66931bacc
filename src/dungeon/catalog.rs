//! Dungeon catalog
//!
//! Owns every loaded definition plus a cursor selecting the current one.
//! Mutating methods take `&mut self`; sharing a catalog between sessions
//! requires the caller to wrap it in a lock.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;

use super::definition::DungeonDefinition;
use super::error::{DungeonError, Result};
use super::example::create_example;
use super::generator::{self, Grid, LevelMetadata};
use super::store;

/// Name of the fallback subdirectory under the base path
pub const EXAMPLES_DIR: &str = "examples";

/// File name used when writing the built-in example
pub const EXAMPLE_FILE: &str = "example_dungeon.json";

#[derive(Debug, Clone)]
pub struct Catalog {
    dungeons: Vec<DungeonDefinition>,
    current: usize,
    base_path: PathBuf,
}

impl Catalog {
    /// Prepare `base_path` and load its definitions
    ///
    /// Creates `base_path` and `base_path/examples`, writes the built-in
    /// example when neither directory holds a definition, then loads from
    /// `base_path`, falling back to `examples`.
    pub fn bootstrap(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        let examples = base_path.join(EXAMPLES_DIR);

        fs::create_dir_all(&base_path).map_err(|e| DungeonError::io(&base_path, e))?;
        fs::create_dir_all(&examples).map_err(|e| DungeonError::io(&examples, e))?;

        if !store::has_definition_files(&base_path)? && !store::has_definition_files(&examples)? {
            let path = examples.join(EXAMPLE_FILE);
            store::save(&create_example(), &path)?;
            log::info!("Created example dungeon at {:?}", path);
        }

        let dungeons = load_with_fallback(&base_path)?;
        log::info!("Loaded {} dungeon definitions from {:?}", dungeons.len(), base_path);

        Ok(Self { dungeons, current: 0, base_path })
    }

    /// Catalog over already-loaded definitions (no filesystem access)
    pub fn from_definitions(base_path: impl Into<PathBuf>, dungeons: Vec<DungeonDefinition>) -> Self {
        Self { dungeons, current: 0, base_path: base_path.into() }
    }

    /// The selected definition
    pub fn current(&self) -> Option<&DungeonDefinition> {
        self.dungeons.get(self.current)
    }

    /// Advance the selection, wrapping past the end
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&DungeonDefinition> {
        if !self.dungeons.is_empty() {
            self.current = (self.current + 1) % self.dungeons.len();
        }
        self.current()
    }

    /// Step the selection back, wrapping past the start
    pub fn previous(&mut self) -> Option<&DungeonDefinition> {
        if !self.dungeons.is_empty() {
            let len = self.dungeons.len();
            self.current = (self.current + len - 1) % len;
        }
        self.current()
    }

    /// First definition with exactly this name
    pub fn by_name(&self, name: &str) -> Option<&DungeonDefinition> {
        self.dungeons.iter().find(|d| d.name == name)
    }

    /// Re-read definitions from disk and reset the selection
    ///
    /// On failure the in-memory catalog is left untouched.
    pub fn reload(&mut self) -> Result<()> {
        let dungeons = load_with_fallback(&self.base_path)?;
        log::info!("Reloaded {} dungeon definitions", dungeons.len());
        self.dungeons = dungeons;
        self.current = 0;
        Ok(())
    }

    /// Generate a level of the current definition
    pub fn generate_current_level<R: Rng + ?Sized>(
        &self,
        level_index: usize,
        rng: &mut R,
    ) -> Result<(Grid, LevelMetadata)> {
        let dungeon = self.current().ok_or(DungeonError::NoCurrentDungeon)?;
        generator::generate(dungeon, level_index, rng)
    }

    pub fn definitions(&self) -> &[DungeonDefinition] {
        &self.dungeons
    }

    pub fn len(&self) -> usize {
        self.dungeons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dungeons.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Definitions in `base_path`, or in its examples folder when it has none
fn load_with_fallback(base_path: &Path) -> Result<Vec<DungeonDefinition>> {
    let mut dungeons = store::load_all(base_path)?;

    if dungeons.is_empty() {
        let examples = base_path.join(EXAMPLES_DIR);
        log::info!("No dungeons in {:?}, falling back to {:?}", base_path, examples);
        dungeons = store::load_all(&examples)?;
    }

    if dungeons.is_empty() {
        return Err(DungeonError::NoDefinitionsFound { path: base_path.to_path_buf() });
    }
    Ok(dungeons)
}
