//! Application configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cricket_core::GameSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Environment variable overriding the store directory.
pub const STORE_DIR_ENV: &str = "WINDOW_CRICKET_STORE_DIR";

/// Settings read from `window_cricket.toml`.
///
/// Every field is optional in the file. Resolution order for the store
/// directory is command-line flag, then [`STORE_DIR_ENV`], then the file,
/// then `$HOME/.window_cricket`.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct AppConfig {
    /// Directory holding game records.
    #[serde(default = "default_store_dir")]
    store_dir: PathBuf,

    /// Highest numbered sector in play.
    #[serde(default = "default_highest_sector")]
    highest_sector: u8,

    /// Lowest numbered sector in play.
    #[serde(default = "default_lowest_sector")]
    lowest_sector: u8,

    /// Points for a scoring bull.
    #[serde(default = "default_bull_points")]
    bull_points: u32,

    /// Milliseconds between marks during replay.
    #[serde(default = "default_replay_interval_ms")]
    replay_interval_ms: u64,
}

#[instrument]
fn default_store_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".window_cricket"),
        None => {
            debug!("HOME not set, using relative store directory");
            PathBuf::from(".window_cricket")
        }
    }
}

fn default_highest_sector() -> u8 {
    GameSettings::default().highest_sector
}

fn default_lowest_sector() -> u8 {
    GameSettings::default().lowest_sector
}

fn default_bull_points() -> u32 {
    GameSettings::default().bull_points
}

fn default_replay_interval_ms() -> u64 {
    700
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            highest_sector: default_highest_sector(),
            lowest_sector: default_lowest_sector(),
            bull_points: default_bull_points(),
            replay_interval_ms: default_replay_interval_ms(),
        }
    }
}

impl AppConfig {
    /// Loads the file at `path` if it exists, then applies [`STORE_DIR_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            debug!("No config file, using defaults");
            Self::default()
        };
        Ok(config.with_env_override(std::env::var_os(STORE_DIR_ENV)))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(store_dir = %config.store_dir.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Replaces the store directory with a non-empty environment value.
    pub fn with_env_override(self, value: Option<OsString>) -> Self {
        match value {
            Some(dir) if !dir.is_empty() => {
                debug!(dir = ?dir, "Store directory from environment");
                self.with_store_dir(dir)
            }
            _ => self,
        }
    }

    /// Sector configuration for new games.
    pub fn settings(&self) -> GameSettings {
        GameSettings::new(self.highest_sector, self.lowest_sector, self.bull_points)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lowest_sector = 10\nstore_dir = \"/srv/darts\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.store_dir(), &PathBuf::from("/srv/darts"));
        assert_eq!(*config.lowest_sector(), 10);
        assert_eq!(*config.highest_sector(), 20);
        assert_eq!(*config.bull_points(), 25);
        assert_eq!(*config.replay_interval_ms(), 700);
        assert_eq!(config.settings(), GameSettings::new(20, 10, 25));
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lowest_sector = \"ten\"").unwrap();
        assert!(AppConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.settings(), GameSettings::default());
    }

    #[test]
    fn test_env_override() {
        let config = AppConfig::default().with_env_override(Some(OsString::from("/tmp/cricket")));
        assert_eq!(config.store_dir(), &PathBuf::from("/tmp/cricket"));

        let config = AppConfig::default().with_env_override(Some(OsString::new()));
        assert_eq!(config.store_dir(), AppConfig::default().store_dir());

        let config = AppConfig::default()
            .with_store_dir("/a")
            .with_env_override(None);
        assert_eq!(config.store_dir(), &PathBuf::from("/a"));
    }
}
