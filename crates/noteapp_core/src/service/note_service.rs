//! Note use-case service.
//!
//! # Responsibility
//! - Validate and stamp notes before they reach the store.
//! - Expose the live, ordered note list.
//! - Delete and restore notes without owning any undo state.
//!
//! # Invariants
//! - `add_or_update_note` stamps `timestamp = now` on every call, overwriting
//!   whatever the caller supplied.
//! - `restore_note` writes the note verbatim; its timestamp is never touched.
//! - Invalid notes never reach the store.
//! - Store errors are passed through unchanged; nothing is retried here.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{InvalidNoteError, Note, NoteId};
use crate::model::order::NoteOrder;
use crate::repo::change_feed::NoteSubscription;
use crate::repo::note_store::{NoteStore, StoreError};
use log::{debug, info};
use std::sync::Arc;
use thiserror::Error;

pub type NoteResult<T> = Result<T, NoteError>;

/// Operation that is never valid for the given note.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidOperationError {
    #[error("note has not been saved yet")]
    UnsavedNote,
}

/// Error surfaced by note use cases.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error(transparent)]
    InvalidNote(#[from] InvalidNoteError),
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Live note list re-sorted under one fixed order.
///
/// Dropping it cancels the underlying store subscription.
#[derive(Debug)]
pub struct OrderedNotes {
    order: NoteOrder,
    subscription: NoteSubscription,
}

impl OrderedNotes {
    pub fn order(&self) -> NoteOrder {
        self.order
    }

    /// Waits for the next store emission and returns it sorted.
    ///
    /// Returns `None` once the store is gone. Cancel safe.
    pub async fn next(&mut self) -> Option<Vec<Note>> {
        let notes = self.subscription.next().await?;
        Some(self.order.sorted(notes))
    }
}

/// Use-case facade over one note store.
pub struct NoteService<S: NoteStore, C: Clock = SystemClock> {
    store: Arc<S>,
    clock: C,
}

impl<S: NoteStore> NoteService<S> {
    /// Creates a service stamping notes with the wall clock.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: NoteStore, C: Clock> NoteService<S, C> {
    pub fn with_clock(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validates, stamps and persists one note.
    ///
    /// Inserts when `note.id` is `None`, replaces otherwise. Returns the note
    /// as stored, including its id and stamped timestamp.
    pub fn add_or_update_note(&self, mut note: Note) -> NoteResult<Note> {
        if let Err(err) = note.validate() {
            debug!("event=note_save module=service status=rejected reason=\"{err}\"");
            return Err(err.into());
        }

        note.timestamp = self.clock.now_millis();
        let stored = self.store.upsert(&note)?;
        info!(
            "event=note_save module=service status=ok mode={} id={}",
            if note.is_new() { "insert" } else { "update" },
            stored.id.unwrap_or_default()
        );
        Ok(stored)
    }

    /// Subscribes to every note, sorted under `order` on each emission.
    pub fn get_notes(&self, order: NoteOrder) -> NoteResult<OrderedNotes> {
        let subscription = self.store.subscribe_all()?;
        Ok(OrderedNotes {
            order,
            subscription,
        })
    }

    /// Fetches one note; `Ok(None)` when no such note exists.
    pub fn get_note_by_id(&self, id: NoteId) -> NoteResult<Option<Note>> {
        Ok(self.store.get_by_id(id)?)
    }

    /// Removes a persisted note from the store.
    ///
    /// A note the store no longer knows is treated as already deleted.
    pub fn delete_note(&self, note: &Note) -> NoteResult<()> {
        let id = note.id.ok_or(InvalidOperationError::UnsavedNote)?;
        match self.store.delete(note) {
            Ok(()) => {
                info!("event=note_delete module=service status=ok id={id}");
                Ok(())
            }
            Err(StoreError::NotFound(_)) => {
                debug!("event=note_delete module=service status=already_gone id={id}");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Re-inserts a previously deleted note under its original id.
    pub fn restore_note(&self, note: &Note) -> NoteResult<Note> {
        let id = note.id.ok_or(InvalidOperationError::UnsavedNote)?;
        let restored = self.store.upsert(note)?;
        info!("event=note_restore module=service status=ok id={id}");
        Ok(restored)
    }
}
