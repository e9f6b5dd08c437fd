//! Store location and connection settings.
//!
//! # Invariants
//! - `from_env` never fails; unset or unparsable values fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_PATH_ENV: &str = "ROSTER_DB_PATH";
pub const BUSY_TIMEOUT_ENV: &str = "ROSTER_BUSY_TIMEOUT_MS";
pub const DEFAULT_DB_FILE_NAME: &str = "roster.sqlite3";
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MEMORY_MARKER: &str = ":memory:";

/// Where the student store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory database; contents vanish with the connection.
    Memory,
}

impl StoreLocation {
    /// Short label used in log events (`file` or `memory`).
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// Settings used by [`crate::db::ConnectionManager`] to open the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: StoreLocation::File(path.as_ref().to_path_buf()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Builds settings from environment variables.
    ///
    /// Reads:
    /// - `ROSTER_DB_PATH` (optional, default `roster.sqlite3`; `:memory:`
    ///   selects an in-memory store)
    /// - `ROSTER_BUSY_TIMEOUT_MS` (optional, default 5000)
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(DB_PATH_ENV).ok().as_deref(),
            std::env::var(BUSY_TIMEOUT_ENV).ok().as_deref(),
        )
    }

    fn from_values(db_path: Option<&str>, busy_timeout_ms: Option<&str>) -> Self {
        let config = match db_path.map(str::trim).filter(|value| !value.is_empty()) {
            Some(MEMORY_MARKER) => Self::in_memory(),
            Some(path) => Self::file(path),
            None => Self::file(DEFAULT_DB_FILE_NAME),
        };

        match busy_timeout_ms.and_then(|value| value.trim().parse::<u64>().ok()) {
            Some(millis) => config.with_busy_timeout(Duration::from_millis(millis)),
            None => config,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::file(DEFAULT_DB_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, StoreLocation, DEFAULT_BUSY_TIMEOUT, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn defaults_to_file_in_working_directory() {
        let config = StoreConfig::from_values(None, None);
        assert_eq!(
            config.location,
            StoreLocation::File(PathBuf::from(DEFAULT_DB_FILE_NAME))
        );
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn memory_marker_selects_in_memory_store() {
        let config = StoreConfig::from_values(Some(" :memory: "), Some("250"));
        assert_eq!(config.location, StoreLocation::Memory);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn unparsable_timeout_falls_back_to_default() {
        let config = StoreConfig::from_values(Some("/tmp/students.db"), Some("soon"));
        assert_eq!(
            config.location,
            StoreLocation::File(PathBuf::from("/tmp/students.db"))
        );
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }
}
