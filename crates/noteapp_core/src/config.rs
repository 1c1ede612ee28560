//! Core configuration.
//!
//! # Responsibility
//! - Describe where notes are stored and how the session behaves.
//! - Parse and validate JSON configuration supplied by the host app.
//!
//! # Invariants
//! - Every field has a default; an empty object is a valid configuration.
//! - `validate()` runs on every parse, so a parsed config is always usable.

use crate::logging::{default_log_level, normalize_level};
use crate::model::order::NoteOrder;
use crate::repo::change_feed::DEFAULT_CHANGE_FEED_CAPACITY;
use crate::repo::note_store::StoreResult;
use crate::repo::sqlite_store::SqliteNoteStore;
use crate::session::{SessionOptions, DEFAULT_UNDO_WINDOW};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Backing location of the SQLite note store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreLocation {
    /// Private in-memory database, lost on exit.
    #[default]
    Memory,
    /// Database file, created when missing.
    File(PathBuf),
}

/// File logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute log directory. File logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoteAppConfig {
    pub store: StoreLocation,
    /// Snapshots buffered per list subscriber.
    pub change_feed_capacity: usize,
    /// Restore window in milliseconds; `null` disables expiry.
    pub undo_window_ms: Option<u64>,
    pub default_order: NoteOrder,
    pub logging: LoggingConfig,
}

impl Default for NoteAppConfig {
    fn default() -> Self {
        Self {
            store: StoreLocation::default(),
            change_feed_capacity: DEFAULT_CHANGE_FEED_CAPACITY,
            undo_window_ms: u64::try_from(DEFAULT_UNDO_WINDOW.as_millis()).ok(),
            default_order: NoteOrder::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl NoteAppConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.change_feed_capacity == 0 {
            return Err(ConfigError::Invalid(
                "change_feed_capacity must be greater than zero".to_string(),
            ));
        }
        normalize_level(&self.logging.level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "logging.dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        if let StoreLocation::File(path) = &self.store {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("store file path cannot be empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn undo_window(&self) -> Option<Duration> {
        self.undo_window_ms.map(Duration::from_millis)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            initial_order: self.default_order,
            undo_window: self.undo_window(),
        }
    }

    /// Opens the configured SQLite store.
    pub fn open_store(&self) -> StoreResult<SqliteNoteStore> {
        match &self.store {
            StoreLocation::Memory => SqliteNoteStore::open_in_memory(self.change_feed_capacity),
            StoreLocation::File(path) => SqliteNoteStore::open(path, self.change_feed_capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, NoteAppConfig, StoreLocation};
    use crate::model::order::{NoteOrder, OrderDirection, OrderKey};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn empty_object_yields_defaults() {
        let config = NoteAppConfig::from_json_str("{}").unwrap();
        assert_eq!(config, NoteAppConfig::default());
        assert_eq!(config.store, StoreLocation::Memory);
        assert_eq!(config.undo_window(), Some(Duration::from_secs(10)));
        assert_eq!(config.default_order, NoteOrder::default());
    }

    #[test]
    fn parses_file_store_order_and_disabled_undo_window() {
        let config = NoteAppConfig::from_json_str(
            r#"{
                "store": { "file": "/var/lib/notes/notes.sqlite3" },
                "undo_window_ms": null,
                "default_order": { "key": "title", "direction": "ascending" },
                "logging": { "level": "WARN", "dir": "/var/log/notes" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.store,
            StoreLocation::File(PathBuf::from("/var/lib/notes/notes.sqlite3"))
        );
        assert_eq!(config.undo_window(), None);
        let options = config.session_options();
        assert_eq!(
            options.initial_order,
            NoteOrder::new(OrderKey::Title, OrderDirection::Ascending)
        );
        assert_eq!(options.undo_window, None);
    }

    #[test]
    fn rejects_zero_feed_capacity() {
        let err = NoteAppConfig::from_json_str(r#"{ "change_feed_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("capacity")));
    }

    #[test]
    fn rejects_relative_log_dir_and_unknown_level() {
        let err = NoteAppConfig::from_json_str(r#"{ "logging": { "dir": "logs" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("absolute")));

        let err =
            NoteAppConfig::from_json_str(r#"{ "logging": { "level": "loud" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("loud")));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = NoteAppConfig::from_json_str(r#"{ "colour": 1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn memory_store_opens() {
        let store = NoteAppConfig::default().open_store();
        assert!(store.is_ok());
    }
}
