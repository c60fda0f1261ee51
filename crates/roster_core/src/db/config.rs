//! Store connection parameters.
//!
//! # Responsibility
//! - Describe where the roster database lives and how long lock waits may
//!   block before surfacing as `StoreTimeout`.
//! - Load those parameters from the process environment for thin callers.
//!
//! # Invariants
//! - A missing `ROSTER_DB_PATH` selects an in-memory store, never a default file.
//! - `busy_timeout_ms` is always positive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "ROSTER_DB_PATH";
pub const BUSY_TIMEOUT_ENV: &str = "ROSTER_BUSY_TIMEOUT_MS";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Where the SQLite database is opened from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreLocation {
    /// On-disk database file, created when missing.
    File { path: PathBuf },
    /// Private in-memory database, discarded with the connection.
    Memory,
}

/// Connection parameters for the roster store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub location: StoreLocation,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Invalid store configuration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBusyTimeout(String),
    EmptyPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBusyTimeout(value) => write!(
                f,
                "{BUSY_TIMEOUT_ENV} must be a positive integer, got `{value}`"
            ),
            Self::EmptyPath => write!(f, "database path cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl StoreConfig {
    /// In-memory store with the default busy timeout.
    pub fn memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// File-backed store with the default busy timeout.
    pub fn file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        Ok(Self {
            location: StoreLocation::File { path },
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        })
    }

    /// Reads `ROSTER_DB_PATH` and `ROSTER_BUSY_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// Split out from [`StoreConfig::from_env`] so tests never touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(DB_PATH_ENV) {
            Some(path) if !path.trim().is_empty() => Self::file(path.trim())?,
            _ => Self::memory(),
        };

        if let Some(raw) = lookup(BUSY_TIMEOUT_ENV) {
            config.busy_timeout_ms = parse_busy_timeout(&raw)?;
        }

        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn parse_busy_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidBusyTimeout(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, StoreLocation, DEFAULT_BUSY_TIMEOUT_MS};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_path_selects_memory_store() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.location, StoreLocation::Memory);
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn path_and_timeout_are_read_from_lookup() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("ROSTER_DB_PATH", " /tmp/roster.db "),
            ("ROSTER_BUSY_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(
            config.location,
            StoreLocation::File {
                path: PathBuf::from("/tmp/roster.db")
            }
        );
        assert_eq!(config.busy_timeout().as_millis(), 250);
    }

    #[test]
    fn zero_or_garbage_timeout_is_rejected() {
        for raw in ["0", "soon", "-5"] {
            let err = StoreConfig::from_lookup(lookup_from(&[("ROSTER_BUSY_TIMEOUT_MS", raw)]))
                .unwrap_err();
            assert_eq!(err, ConfigError::InvalidBusyTimeout(raw.to_string()));
        }
    }

    #[test]
    fn empty_file_path_is_rejected() {
        assert_eq!(StoreConfig::file("").unwrap_err(), ConfigError::EmptyPath);
    }
}
