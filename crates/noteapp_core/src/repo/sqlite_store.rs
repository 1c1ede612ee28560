//! SQLite-backed `NoteStore`.
//!
//! # Responsibility
//! - Persist notes in the `notes` table created by migration 0001.
//! - Publish a fresh snapshot to the change feed after every mutation.
//!
//! # Invariants
//! - The connection is guarded by one mutex; writes, snapshot reads and
//!   subscription registration are serialized through it.
//! - Upsert with an explicit id keeps that id (restore path).

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Note, NoteId};
use crate::repo::change_feed::{NoteChangeFeed, NoteSubscription};
use crate::repo::note_store::{require_id, NoteStore, StoreError, StoreResult};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    timestamp,
    color
FROM notes";

const REQUIRED_COLUMNS: [&str; 5] = ["id", "title", "content", "timestamp", "color"];

/// Production note store over one SQLite connection.
#[derive(Debug)]
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
    feed: NoteChangeFeed,
}

impl SqliteNoteStore {
    /// Wraps a migrated connection.
    ///
    /// Fails with `InvalidData` when the `notes` table is missing or lacks a
    /// required column.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        Self::with_feed(conn, NoteChangeFeed::new())
    }

    /// Wraps a migrated connection, publishing through `feed`.
    pub fn with_feed(conn: Connection, feed: NoteChangeFeed) -> StoreResult<Self> {
        ensure_notes_table_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            feed,
        })
    }

    /// Opens a database file, applying migrations first.
    pub fn open(path: impl AsRef<Path>, feed_capacity: usize) -> StoreResult<Self> {
        let conn = open_db(path)?;
        Self::with_feed(conn, NoteChangeFeed::with_capacity(feed_capacity))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory(feed_capacity: usize) -> StoreResult<Self> {
        let conn = open_db_in_memory()?;
        Self::with_feed(conn, NoteChangeFeed::with_capacity(feed_capacity))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Republishes after a committed write.
    ///
    /// A failed reload is logged, not returned: the write itself succeeded.
    fn publish_locked(&self, conn: &Connection, operation: &'static str) {
        match load_all(conn) {
            Ok(notes) => {
                debug!(
                    "event=note_feed_publish module=repo status=ok op={operation} count={}",
                    notes.len()
                );
                self.feed.publish(notes);
            }
            Err(err) => {
                error!(
                    "event=note_feed_publish module=repo status=error op={operation} error={err}"
                );
            }
        }
    }
}

impl NoteStore for SqliteNoteStore {
    fn subscribe_all(&self) -> StoreResult<NoteSubscription> {
        let conn = self.lock()?;
        let current = load_all(&conn)?;
        Ok(self.feed.subscribe(current))
    }

    fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], RawNote::from_row).optional()?;
        raw.map(RawNote::into_note).transpose()
    }

    fn upsert(&self, note: &Note) -> StoreResult<Note> {
        let conn = self.lock()?;
        let id = match note.id {
            None => {
                conn.execute(
                    "INSERT INTO notes (title, content, timestamp, color)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        note.title.as_str(),
                        note.content.as_str(),
                        note.timestamp,
                        note.color
                    ],
                )?;
                conn.last_insert_rowid()
            }
            Some(id) => {
                conn.execute(
                    "INSERT OR REPLACE INTO notes (id, title, content, timestamp, color)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        id,
                        note.title.as_str(),
                        note.content.as_str(),
                        note.timestamp,
                        note.color
                    ],
                )?;
                id
            }
        };

        self.publish_locked(&conn, "upsert");
        Ok(Note {
            id: Some(id),
            ..note.clone()
        })
    }

    fn delete(&self, note: &Note) -> StoreResult<()> {
        let id = require_id(note)?;
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        self.publish_locked(&conn, "delete");
        Ok(())
    }
}

/// Row image before integrity checks.
struct RawNote {
    id: NoteId,
    title: String,
    content: String,
    timestamp: i64,
    color: i64,
}

impl RawNote {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            timestamp: row.get("timestamp")?,
            color: row.get("color")?,
        })
    }

    fn into_note(self) -> StoreResult<Note> {
        let color = i32::try_from(self.color).map_err(|_| {
            StoreError::InvalidData(format!(
                "color `{}` out of range in notes.color for id {}",
                self.color, self.id
            ))
        })?;
        Ok(Note {
            id: Some(self.id),
            title: self.title,
            content: self.content,
            timestamp: self.timestamp,
            color,
        })
    }
}

fn load_all(conn: &Connection) -> StoreResult<Vec<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(RawNote::from_row(row)?.into_note()?);
    }
    Ok(notes)
}

fn ensure_notes_table_ready(conn: &Connection) -> StoreResult<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(notes);")?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    if columns.is_empty() {
        return Err(StoreError::InvalidData(
            "missing required table `notes`".to_string(),
        ));
    }
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(StoreError::InvalidData(format!(
                "missing required column `notes.{required}`"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::SqliteNoteStore;
    use crate::model::note::{Note, NoteColor};
    use crate::repo::note_store::{NoteStore, StoreError};
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteNoteStore::try_new(conn).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(message) if message.contains("notes")));
    }

    #[test]
    fn out_of_range_color_is_reported_as_invalid_data() {
        let store = SqliteNoteStore::open_in_memory(4).unwrap();
        let saved = store
            .upsert(&Note::new("t", "c", NoteColor::Violet))
            .unwrap();
        {
            let conn = store.lock().unwrap();
            conn.execute(
                "UPDATE notes SET color = ?1 WHERE id = ?2;",
                rusqlite::params![i64::MAX, saved.id],
            )
            .unwrap();
        }

        let err = store.get_by_id(saved.id.unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}
