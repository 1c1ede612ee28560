//! Domain model for the note list.
//!
//! # Responsibility
//! - Define the note entity and its write-boundary validation.
//! - Define the ordering value object applied to every note list.
//!
//! # Invariants
//! - A note without `id` is new; one with `id` is persisted.
//! - Ordering never mutates notes, only their position.

pub mod note;
pub mod order;
