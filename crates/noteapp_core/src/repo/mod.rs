//! Note persistence contracts and store implementations.
//!
//! # Responsibility
//! - Define the `NoteStore` collaborator contract used by the use-case layer.
//! - Provide a SQLite-backed production store and an in-memory store.
//! - Broadcast a full note snapshot after every mutation.
//!
//! # Invariants
//! - Stores never validate notes; validation belongs to the write use case.
//! - Snapshots are in storage order (ascending `id`).

pub mod change_feed;
pub mod memory_store;
pub mod note_store;
pub mod sqlite_store;
