//! Broadcast feed of note snapshots.
//!
//! Each store owns one feed and publishes the complete note list after every
//! mutation. Subscribers first receive the snapshot captured at subscription
//! time, then every published snapshot in order.

use crate::model::note::Note;
use log::warn;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Snapshots buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANGE_FEED_CAPACITY: usize = 64;

type Snapshot = Arc<Vec<Note>>;

/// Publisher side of the snapshot feed.
#[derive(Debug, Clone)]
pub struct NoteChangeFeed {
    sender: broadcast::Sender<Snapshot>,
}

impl NoteChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANGE_FEED_CAPACITY)
    }

    /// Creates a feed buffering `capacity` snapshots per subscriber.
    ///
    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes one snapshot to every live subscriber.
    pub fn publish(&self, notes: Vec<Note>) {
        // No subscribers is not an error.
        let _ = self.sender.send(Arc::new(notes));
    }

    /// Registers a subscriber whose first item is `current`.
    ///
    /// Callers must hold the store lock while capturing `current` and calling
    /// this, so no mutation falls between the snapshot and the live feed.
    pub fn subscribe(&self, current: Vec<Note>) -> NoteSubscription {
        NoteSubscription {
            initial: Some(current),
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NoteChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Live, cancellable sequence of note snapshots.
///
/// Dropping the subscription cancels it.
#[derive(Debug)]
pub struct NoteSubscription {
    initial: Option<Vec<Note>>,
    receiver: broadcast::Receiver<Snapshot>,
}

impl NoteSubscription {
    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the owning store is gone. Cancel safe.
    pub async fn next(&mut self) -> Option<Vec<Note>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot.as_ref().clone()),
                Err(RecvError::Lagged(skipped)) => {
                    // Snapshots are complete lists; skipping stale ones loses no state.
                    warn!("event=note_feed_lagged module=repo status=degraded skipped={skipped}");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
