//! User configuration, read from `config.yml` in the platform config dir.

use crate::storage::Backend;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name within the app config directory.
const CONFIG_FILE: &str = "config.yml";

/// Default clock layout, e.g. "Friday, March 1, 2024 09:30".
pub const DEFAULT_CLOCK_FORMAT: &str = "%A, %B %-d, %Y %H:%M";

/// Default layout for a task's creation time.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage backend for the store directory
    pub backend: Backend,

    /// strftime layout of the clock line
    pub clock_format: String,

    /// strftime layout of each task's creation time
    pub time_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            clock_format: DEFAULT_CLOCK_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl Config {
    /// Path of the user config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("todos").join(CONFIG_FILE))
    }

    /// Load the user config, falling back to defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override the backend.
    pub fn with_backend(mut self, backend: Option<Backend>) -> Self {
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.yml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "backend: file\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend, Backend::File);
        assert_eq!(config.clock_format, DEFAULT_CLOCK_FORMAT);
        assert_eq!(config.time_format, DEFAULT_TIME_FORMAT);
    }

    #[test]
    fn test_full_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "backend: sqlite\nclock_format: \"%Y-%m-%d %H:%M\"\ntime_format: \"%I:%M %p\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.clock_format, "%Y-%m-%d %H:%M");
        assert_eq!(config.time_format, "%I:%M %p");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "backend: floppy\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_backend_override() {
        let config = Config::default().with_backend(Some(Backend::File));
        assert_eq!(config.backend, Backend::File);

        let config = config.with_backend(None);
        assert_eq!(config.backend, Backend::File);
    }
}
