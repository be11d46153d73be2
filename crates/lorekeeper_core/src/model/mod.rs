//! Domain model for notebooks, notes and notables.
//!
//! # Responsibility
//! - Define records shared by the repository and service layers.
//! - Validate user input before it reaches persistence.
//!
//! # Invariants
//! - Record ids are SQLite row ids and are never reused.
//! - Notable kind is a closed set; unknown kinds are rejected at parse time.

pub mod link;
pub mod notable;
pub mod note;
pub mod notebook;
pub mod validation;

/// Authenticated owner identity handed in by the session layer.
pub type UserId = uuid::Uuid;
pub type NotebookId = i64;
pub type NoteId = i64;
pub type NotableId = i64;
