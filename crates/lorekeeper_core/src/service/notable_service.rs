//! Notable use-case service.
//!
//! # Responsibility
//! - Validate and persist characters, items and locations of one notebook.
//! - Track detail views for the recents list.
//!
//! # Invariants
//! - Kind is fixed at creation; updates only touch name and description.
//! - Deleting a notable deletes every note that references it.

use crate::model::notable::{Notable, NotableChanges, NotableDraft, NotableKind};
use crate::model::validation::ValidationErrors;
use crate::model::{NotableId, NoteId, NotebookId};
use crate::repo::notable_repo::{NotableListQuery, NotableRepository};
use crate::repo::{now_epoch_ms, RecordRef, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of entries in the recently viewed list.
pub const RECENT_NOTABLES_LIMIT: u32 = 5;

/// Service error for notable use-cases.
#[derive(Debug)]
pub enum NotableServiceError {
    Invalid(ValidationErrors),
    NotebookNotFound(NotebookId),
    NotableNotFound(NotableId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NotableServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "invalid notable: {errors}"),
            Self::NotebookNotFound(id) => write!(f, "notebook not found: {id}"),
            Self::NotableNotFound(id) => write!(f, "notable not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotableServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NotableServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(RecordRef::Notebook(id)) => Self::NotebookNotFound(id),
            RepoError::NotFound(RecordRef::Notable(id)) => Self::NotableNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for NotableServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

/// Notable service facade over repository implementations.
pub struct NotableService<R: NotableRepository> {
    repo: R,
}

impl<R: NotableRepository> NotableService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a notable at the end of the notebook's shared order.
    pub fn create_notable(
        &self,
        notebook_id: NotebookId,
        draft: NotableDraft,
    ) -> Result<Notable, NotableServiceError> {
        draft.validate()?;
        Ok(self.repo.create_notable(notebook_id, &draft, now_epoch_ms())?)
    }

    /// Fetches a notable without recording a view.
    pub fn get_notable(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
    ) -> Result<Notable, NotableServiceError> {
        self.repo
            .get_notable(notebook_id, id)?
            .ok_or(NotableServiceError::NotableNotFound(id))
    }

    /// Fetches a notable for its detail page and records the view.
    pub fn show_notable(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
    ) -> Result<Notable, NotableServiceError> {
        self.show_notable_at(notebook_id, id, now_epoch_ms())
    }

    /// Same as [`Self::show_notable`] with an explicit view time (epoch ms).
    pub fn show_notable_at(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
        viewed_at: i64,
    ) -> Result<Notable, NotableServiceError> {
        self.repo.mark_viewed(notebook_id, id, viewed_at)?;
        self.get_notable(notebook_id, id)
    }

    pub fn update_notable(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
        changes: NotableChanges,
    ) -> Result<Notable, NotableServiceError> {
        changes.validate()?;
        Ok(self.repo.update_notable(notebook_id, id, &changes)?)
    }

    /// Deletes the notable together with every note that references it.
    ///
    /// Returns the ids of the deleted notes.
    pub fn delete_notable(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
    ) -> Result<Vec<NoteId>, NotableServiceError> {
        let deleted_notes = self.repo.delete_notable(notebook_id, id)?;
        log::info!(
            "event=notable_delete module=service status=ok notebook_id={} notable_id={} deleted_notes={}",
            notebook_id,
            id,
            deleted_notes.len()
        );
        Ok(deleted_notes)
    }

    pub fn list_notables(
        &self,
        notebook_id: NotebookId,
        query: &NotableListQuery,
    ) -> Result<Vec<Notable>, NotableServiceError> {
        Ok(self.repo.list_notables(notebook_id, query)?)
    }

    /// Notables of one kind, by order index.
    pub fn list_by_kind(
        &self,
        notebook_id: NotebookId,
        kind: NotableKind,
    ) -> Result<Vec<Notable>, NotableServiceError> {
        let query = NotableListQuery {
            kind: Some(kind),
            name_contains: None,
        };
        self.list_notables(notebook_id, &query)
    }

    /// The most recently viewed notables, newest first.
    pub fn recent_notables(
        &self,
        notebook_id: NotebookId,
    ) -> Result<Vec<Notable>, NotableServiceError> {
        Ok(self
            .repo
            .recent_notables(notebook_id, RECENT_NOTABLES_LIMIT)?)
    }
}
