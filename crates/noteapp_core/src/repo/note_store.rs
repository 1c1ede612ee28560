//! `NoteStore` collaborator contract.
//!
//! # Invariants
//! - `upsert` assigns an id when absent and replaces the row when present.
//! - `delete` of an unknown id fails with `StoreError::NotFound`.
//! - Every successful mutation publishes one snapshot to live subscriptions.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use crate::repo::change_feed::NoteSubscription;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a note store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("note not found: {0}")]
    NotFound(NoteId),
    #[error("invalid persisted note data: {0}")]
    InvalidData(String),
    #[error("note store lock poisoned")]
    Poisoned,
    #[error("note store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistent keyed collection of notes.
pub trait NoteStore: Send + Sync {
    /// Subscribes to the full note collection.
    fn subscribe_all(&self) -> StoreResult<NoteSubscription>;
    /// Gets one note; `Ok(None)` when absent.
    fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Inserts or replaces one note and returns it with its id.
    fn upsert(&self, note: &Note) -> StoreResult<Note>;
    /// Removes one persisted note.
    fn delete(&self, note: &Note) -> StoreResult<()>;
}

/// Extracts the id a delete needs, rejecting unsaved notes.
pub(crate) fn require_id(note: &Note) -> StoreResult<NoteId> {
    note.id
        .ok_or_else(|| StoreError::InvalidData("note without id cannot be deleted".to_string()))
}
