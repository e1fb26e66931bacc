//! Runtime configuration
//!
//! Read once at startup from environment variables.

use std::path::PathBuf;

/// Default number of levels in a run
pub const DEFAULT_MAX_DEPTH: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding dungeon definition files
    pub dungeon_dir: PathBuf,
    /// Reveal the whole map and log at debug level
    pub debug: bool,
    /// Where the log file is written
    pub log_file: PathBuf,
    /// Levels to clear before the run is won
    pub max_depth: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let max_depth = match get("CRYPTCRAWL_MAX_DEPTH") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(depth) if depth > 0 => depth,
                _ => {
                    log::warn!("Invalid CRYPTCRAWL_MAX_DEPTH value: {}, using default: {}", raw, DEFAULT_MAX_DEPTH);
                    DEFAULT_MAX_DEPTH
                }
            },
            None => DEFAULT_MAX_DEPTH,
        };

        Self {
            dungeon_dir: get("DUNGEON_DIR").map(PathBuf::from).unwrap_or_else(default_dungeon_dir),
            debug: get("DEBUG").is_some_and(|v| v == "true"),
            log_file: get("CRYPTCRAWL_LOG").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("cryptcrawl.log")),
            max_depth,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Platform data directory, or `./dungeons` when none can be determined
pub fn default_dungeon_dir() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "cryptcrawl", "CryptCrawl") {
        proj_dirs.data_local_dir().join("dungeons")
    } else {
        PathBuf::from("./dungeons")
    }
}
