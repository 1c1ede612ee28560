//! Note domain model and write-boundary validation.
//!
//! # Responsibility
//! - Define the canonical `Note` record exchanged between session, use cases
//!   and stores.
//! - Own the fixed color palette and the pre-persistence validation rules.
//!
//! # Invariants
//! - `id == None` means the note was never persisted; the store assigns it.
//! - `timestamp` is stamped by the use-case layer, never edited by callers.
//! - Validation runs only on the write path; reads are never re-validated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned note identifier (SQLite rowid).
pub type NoteId = i64;

/// Fixed five-entry palette a note color must come from.
///
/// Values are 32-bit ARGB colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteColor {
    #[default]
    RedOrange,
    LightGreen,
    Violet,
    BabyBlue,
    RedPink,
}

impl NoteColor {
    /// Palette in display order.
    pub const ALL: [NoteColor; 5] = [
        NoteColor::RedOrange,
        NoteColor::LightGreen,
        NoteColor::Violet,
        NoteColor::BabyBlue,
        NoteColor::RedPink,
    ];

    /// Returns the ARGB value stored in `Note::color`.
    pub const fn argb(self) -> i32 {
        let value: u32 = match self {
            NoteColor::RedOrange => 0xFFFF_AB91,
            NoteColor::LightGreen => 0xFFCF_D95C,
            NoteColor::Violet => 0xFFB3_9DDB,
            NoteColor::BabyBlue => 0xFF81_DEEA,
            NoteColor::RedPink => 0xFFF4_8FB1,
        };
        value as i32
    }

    /// Maps a stored ARGB value back to its palette entry.
    pub fn from_argb(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.argb() == value)
    }
}

/// One user note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// `None` until the first successful store write.
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds of the last add/update.
    pub timestamp: i64,
    /// ARGB value from [`NoteColor`].
    pub color: i32,
}

/// Reason a note was rejected before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidNoteError {
    #[error("title empty")]
    TitleEmpty,
    #[error("content empty")]
    ContentEmpty,
    #[error("color {0:#010x} is not part of the note palette")]
    UnknownColor(i32),
}

impl Note {
    /// Creates an unsaved note with timestamp `0`.
    ///
    /// The timestamp is overwritten by the use-case layer on save.
    pub fn new(title: impl Into<String>, content: impl Into<String>, color: NoteColor) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            timestamp: 0,
            color: color.argb(),
        }
    }

    /// Returns whether this note has never been written to a store.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the palette entry of `color`, if it is one.
    pub fn palette_color(&self) -> Option<NoteColor> {
        NoteColor::from_argb(self.color)
    }

    /// Checks the note is fit to be persisted.
    ///
    /// # Contract
    /// - Rules run in order: title, content, color.
    /// - Only the first violation is reported.
    /// - Pure function of the note fields.
    pub fn validate(&self) -> Result<(), InvalidNoteError> {
        if is_blank(&self.title) {
            return Err(InvalidNoteError::TitleEmpty);
        }
        if is_blank(&self.content) {
            return Err(InvalidNoteError::ContentEmpty);
        }
        if self.palette_color().is_none() {
            return Err(InvalidNoteError::UnknownColor(self.color));
        }
        Ok(())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::{InvalidNoteError, Note, NoteColor};

    #[test]
    fn validate_accepts_well_formed_note() {
        let note = Note::new("Groceries", "milk, eggs", NoteColor::Violet);
        assert_eq!(note.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_whitespace_only_title() {
        let note = Note::new(" \t\n", "body", NoteColor::Violet);
        assert_eq!(note.validate(), Err(InvalidNoteError::TitleEmpty));
    }

    #[test]
    fn validate_reports_title_before_content() {
        let note = Note::new("", "", NoteColor::Violet);
        assert_eq!(note.validate(), Err(InvalidNoteError::TitleEmpty));
        assert_eq!(note.validate().unwrap_err().to_string(), "title empty");
    }

    #[test]
    fn validate_rejects_blank_content() {
        let note = Note::new("title", "   ", NoteColor::Violet);
        let err = note.validate().unwrap_err();
        assert_eq!(err, InvalidNoteError::ContentEmpty);
        assert_eq!(err.to_string(), "content empty");
    }

    #[test]
    fn validate_rejects_color_outside_palette() {
        let mut note = Note::new("title", "body", NoteColor::Violet);
        note.color = 0x0012_3456;
        assert_eq!(
            note.validate(),
            Err(InvalidNoteError::UnknownColor(0x0012_3456))
        );
    }

    #[test]
    fn palette_roundtrips_through_argb() {
        for color in NoteColor::ALL {
            assert_eq!(NoteColor::from_argb(color.argb()), Some(color));
        }
        assert_eq!(NoteColor::from_argb(0), None);
    }

    #[test]
    fn new_note_is_unsaved() {
        let note = Note::new("a", "b", NoteColor::default());
        assert!(note.is_new());
        assert_eq!(note.palette_color(), Some(NoteColor::RedOrange));
    }
}
