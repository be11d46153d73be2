//! Core domain logic for Lorekeeper notebooks.
//!
//! Notes reference characters, items and locations with inline tokens such as
//! `@[Bob](@5)`. This crate parses those tokens, keeps each note's link set in
//! step with its content and assigns stable per-notebook ordering.

pub mod db;
pub mod logging;
pub mod model;
pub mod reference;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::link::LinkDelta;
pub use model::notable::{Notable, NotableChanges, NotableDraft, NotableKind, UnknownNotableKind};
pub use model::note::Note;
pub use model::notebook::{Notebook, NotebookDraft};
pub use model::validation::{Field, ValidationError, ValidationErrors};
pub use model::{NotableId, NoteId, NotebookId, UserId};
pub use repo::notable_repo::{
    NotableListQuery, NotableLookup, NotableRepository, SqliteNotableRepository,
};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::notebook_repo::{NotebookRepository, SqliteNotebookRepository};
pub use repo::sequence::{next_order_index, OrderScope};
pub use repo::{RecordRef, RepoError, RepoResult};
pub use service::notable_service::{NotableService, NotableServiceError, RECENT_NOTABLES_LIMIT};
pub use service::note_service::{LinkedNote, NoteService, NoteServiceError};
pub use service::notebook_service::{NotebookService, NotebookServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
