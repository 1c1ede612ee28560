//! UI-facing note list state and intents.

use crate::model::note::Note;
use crate::model::order::NoteOrder;

/// Snapshot published to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesState {
    /// Notes sorted under `order`, replaced on every store emission.
    pub notes: Vec<Note>,
    pub order: NoteOrder,
    pub is_order_section_visible: bool,
    /// Single-slot undo buffer.
    pub recently_deleted: Option<Note>,
}

/// User intent handled by the note list session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesEvent {
    ChangeOrder(NoteOrder),
    ToggleOrderSection,
    DeleteNote(Note),
    RestoreNote,
}
