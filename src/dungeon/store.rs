//! Definition store
//!
//! Loads and saves dungeon definitions as JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use super::definition::DungeonDefinition;
use super::error::{DungeonError, Result};

/// File extension of definition files
pub const DEFINITION_EXTENSION: &str = "json";

/// Load a single definition file
pub fn load(path: impl AsRef<Path>) -> Result<DungeonDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| DungeonError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| DungeonError::MalformedDefinition {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every definition file directly inside `dir`
///
/// Files that fail to load are skipped with a warning. Order follows
/// filesystem enumeration and is not guaranteed.
pub fn load_all(dir: impl AsRef<Path>) -> Result<Vec<DungeonDefinition>> {
    let dir = dir.as_ref();
    let mut definitions = Vec::new();

    for path in definition_files(dir)? {
        match load(&path) {
            Ok(def) => {
                log::debug!("Loaded dungeon '{}' from {:?}", def.name, path);
                definitions.push(def);
            }
            Err(e) => log::warn!("Skipping dungeon definition {:?}: {}", path, e),
        }
    }

    Ok(definitions)
}

/// Save a definition as pretty-printed JSON, creating parent directories
pub fn save(def: &DungeonDefinition, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(def)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DungeonError::io(parent, e))?;
    }
    fs::write(path, json).map_err(|e| DungeonError::io(path, e))?;

    log::info!("Dungeon '{}' saved to {:?}", def.name, path);
    Ok(())
}

/// Whether `dir` directly contains at least one definition file
pub fn has_definition_files(dir: impl AsRef<Path>) -> Result<bool> {
    Ok(!definition_files(dir.as_ref())?.is_empty())
}

/// Paths of regular files in `dir` carrying the definition extension
fn definition_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| DungeonError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DungeonError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_definition_file(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn is_definition_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == DEFINITION_EXTENSION)
}
