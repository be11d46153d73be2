//! Note domain model.
//!
//! # Invariants
//! - `order_index` is unique within the owning notebook and never reassigned.
//! - Links to notables are derived from `content`; they are not note fields.

use crate::model::validation::{check_text, Field, ValidationErrors};
use crate::model::{NoteId, NotebookId};
use serde::{Deserialize, Serialize};

/// Minimum note content length in characters.
pub const NOTE_CONTENT_MIN_CHARS: usize = 5;
/// Maximum note content length in characters.
pub const NOTE_CONTENT_MAX_CHARS: usize = 1000;

/// Persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub notebook_id: NotebookId,
    pub content: String,
    pub order_index: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Presence and length checks for note content.
///
/// Reference-token checks live in `reference::validator`.
pub fn validate_note_content(content: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_text(
        &mut errors,
        Field::Content,
        content,
        Some(NOTE_CONTENT_MIN_CHARS),
        Some(NOTE_CONTENT_MAX_CHARS),
    );
    errors
}
