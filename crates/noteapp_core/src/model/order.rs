//! Note ordering value objects and comparator.
//!
//! # Responsibility
//! - Describe the requested list order as a `(key, direction)` pair.
//! - Provide the single comparator used to sort every emitted note list.
//!
//! # Invariants
//! - `Descending` inverts the natural comparison, so ties stay ties.
//! - There is no secondary key. Equal-key notes keep the relative order of
//!   the input (stable sort only; no semantic guarantee).

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Field a note list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKey {
    /// Case-sensitive lexicographic title order.
    Title,
    /// Numeric `timestamp` order.
    Date,
    /// Numeric `color` order.
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// Requested note list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteOrder {
    pub key: OrderKey,
    pub direction: OrderDirection,
}

impl Default for NoteOrder {
    /// Newest notes first.
    fn default() -> Self {
        Self::new(OrderKey::Date, OrderDirection::Descending)
    }
}

impl NoteOrder {
    pub const fn new(key: OrderKey, direction: OrderDirection) -> Self {
        Self { key, direction }
    }

    /// Same direction, different key.
    pub const fn with_key(self, key: OrderKey) -> Self {
        Self::new(key, self.direction)
    }

    /// Same key, different direction.
    pub const fn with_direction(self, direction: OrderDirection) -> Self {
        Self::new(self.key, direction)
    }

    /// Compares two notes under this order.
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        let natural = match self.key {
            OrderKey::Title => a.title.cmp(&b.title),
            OrderKey::Date => a.timestamp.cmp(&b.timestamp),
            OrderKey::Color => a.color.cmp(&b.color),
        };
        match self.direction {
            OrderDirection::Ascending => natural,
            OrderDirection::Descending => natural.reverse(),
        }
    }

    /// Sorts `notes` in place with a stable sort.
    pub fn sort(&self, notes: &mut [Note]) {
        notes.sort_by(|a, b| self.compare(a, b));
    }

    /// Consumes and returns `notes` sorted under this order.
    pub fn sorted(&self, mut notes: Vec<Note>) -> Vec<Note> {
        self.sort(&mut notes);
        notes
    }
}
