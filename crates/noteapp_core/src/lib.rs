//! Note management core.
//!
//! Owns note validation, list ordering and delete/undo recovery, independent
//! of any UI toolkit. Persistence goes through the `NoteStore` contract, with
//! a SQLite implementation for production and an in-memory one for tests.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LoggingConfig, NoteAppConfig, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{InvalidNoteError, Note, NoteColor, NoteId};
pub use model::order::{NoteOrder, OrderDirection, OrderKey};
pub use repo::change_feed::{NoteChangeFeed, NoteSubscription};
pub use repo::memory_store::InMemoryNoteStore;
pub use repo::note_store::{NoteStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteNoteStore;
pub use service::note_service::{
    InvalidOperationError, NoteError, NoteResult, NoteService, OrderedNotes,
};
pub use session::{NoteListSession, NotesEvent, NotesState, SessionError, SessionOptions};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
