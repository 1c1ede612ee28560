//! In-memory `NoteStore` used by tests and ephemeral sessions.
//!
//! Mirrors the SQLite store contract (AUTOINCREMENT-style id assignment,
//! replace-on-conflict, snapshot per mutation) and adds failure injection
//! plus a write counter so callers can assert on store traffic.

use crate::model::note::{Note, NoteId};
use crate::repo::change_feed::{NoteChangeFeed, NoteSubscription};
use crate::repo::note_store::{require_id, NoteStore, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct MemoryState {
    notes: BTreeMap<NoteId, Note>,
    /// `None` once `NoteId::MAX` has been used.
    next_id: Option<NoteId>,
    failure: Option<String>,
    writes: usize,
}

impl MemoryState {
    fn check_available(&self) -> StoreResult<()> {
        match &self.failure {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn snapshot(&self) -> Vec<Note> {
        self.notes.values().cloned().collect()
    }

    fn insert(&mut self, note: &Note) -> StoreResult<Note> {
        let id = match note.id {
            Some(id) => id,
            None => self
                .next_id
                .ok_or_else(|| StoreError::InvalidData("note ids exhausted".to_string()))?,
        };
        if self.next_id.is_some_and(|next| id >= next) {
            self.next_id = id.checked_add(1);
        }

        let stored = Note {
            id: Some(id),
            ..note.clone()
        };
        self.notes.insert(id, stored.clone());
        Ok(stored)
    }
}

#[derive(Debug)]
pub struct InMemoryNoteStore {
    state: Mutex<MemoryState>,
    feed: NoteChangeFeed,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::with_feed(NoteChangeFeed::new())
    }

    pub fn with_feed(feed: NoteChangeFeed) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                notes: BTreeMap::new(),
                next_id: Some(1),
                failure: None,
                writes: 0,
            }),
            feed,
        }
    }

    /// Creates a store pre-populated with `notes`.
    ///
    /// Seeding neither counts as a write nor publishes a snapshot.
    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            for note in notes {
                if state.insert(&note).is_err() {
                    break;
                }
            }
        }
        store
    }

    /// Makes every following operation fail with `StoreError::Unavailable`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = Some(reason.into());
        }
    }

    /// Clears an injected failure.
    pub fn recover(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = None;
        }
    }

    /// Number of successful upserts and deletes so far.
    pub fn write_count(&self) -> usize {
        self.state.lock().map_or(0, |state| state.writes)
    }

    /// Current notes in storage order.
    pub fn notes(&self) -> Vec<Note> {
        self.state
            .lock()
            .map_or_else(|_| Vec::new(), |state| state.snapshot())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        state.check_available()?;
        Ok(state)
    }
}

impl Default for InMemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStore for InMemoryNoteStore {
    fn subscribe_all(&self) -> StoreResult<NoteSubscription> {
        let state = self.lock()?;
        Ok(self.feed.subscribe(state.snapshot()))
    }

    fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let state = self.lock()?;
        Ok(state.notes.get(&id).cloned())
    }

    fn upsert(&self, note: &Note) -> StoreResult<Note> {
        let mut state = self.lock()?;
        let stored = state.insert(note)?;
        state.writes += 1;
        self.feed.publish(state.snapshot());
        Ok(stored)
    }

    fn delete(&self, note: &Note) -> StoreResult<()> {
        let id = require_id(note)?;
        let mut state = self.lock()?;
        if state.notes.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        state.writes += 1;
        self.feed.publish(state.snapshot());
        Ok(())
    }
}
