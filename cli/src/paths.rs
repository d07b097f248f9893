//! Path utilities for glovetalk.

use std::io;
use std::path::PathBuf;

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".glovetalk";

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Provides access to the glovetalk directory structure.
#[derive(Debug, Clone)]
pub struct Paths {
    /// User's home directory.
    pub home_dir: PathBuf,
}

impl Paths {
    /// Creates a Paths instance rooted at the user's home directory.
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self { home_dir })
    }

    /// Creates a Paths instance rooted at `home_dir`.
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
        }
    }

    /// Returns the base directory (~/.glovetalk).
    pub fn base_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_BASE_DIR)
    }

    /// Returns the config file path (~/.glovetalk/config.yaml).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir().join(DEFAULT_CONFIG_FILE)
    }

    /// Returns the cache directory for synthesized audio (~/.glovetalk/cache).
    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir().join("cache")
    }

    /// Creates the cache directory if it doesn't exist.
    pub fn ensure_cache_dir(&self) -> io::Result<PathBuf> {
        let dir = self.cache_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
