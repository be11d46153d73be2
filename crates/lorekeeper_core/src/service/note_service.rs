//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/get/list/delete APIs scoped to one notebook.
//! - Own the save pipeline: validate, scan, resolve, then persist content and
//!   links together.
//!
//! # Invariants
//! - `validate_and_link` is the only path that writes note content.
//! - A rejected save leaves the stored note and its links untouched.
//! - Saving the same content twice produces the same link set.

use crate::model::link::LinkDelta;
use crate::model::notable::Notable;
use crate::model::note::Note;
use crate::model::validation::ValidationErrors;
use crate::model::{NotableId, NoteId, NotebookId};
use crate::repo::note_repo::NoteRepository;
use crate::repo::{RecordRef, RepoError};
use crate::service::link_service::{link_status_message, resolve_links, LinkError};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Content or reference errors, all collected from one save attempt.
    Invalid(ValidationErrors),
    NotebookNotFound(NotebookId),
    NoteNotFound(NoteId),
    NotableNotFound(NotableId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "invalid note: {errors}"),
            Self::NotebookNotFound(id) => write!(f, "notebook not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::NotableNotFound(id) => write!(f, "notable not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(RecordRef::Notebook(id)) => Self::NotebookNotFound(id),
            RepoError::NotFound(RecordRef::Note(id)) => Self::NoteNotFound(id),
            RepoError::NotFound(RecordRef::Notable(id)) => Self::NotableNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<LinkError> for NoteServiceError {
    fn from(value: LinkError) -> Self {
        match value {
            LinkError::Invalid(errors) => Self::Invalid(errors),
            LinkError::Repo(err) => err.into(),
        }
    }
}

/// Outcome of one successful note save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedNote {
    pub note: Note,
    /// Linked notables in order of first appearance in the content.
    pub notables: Vec<Notable>,
    /// Link rows removed and added by this save.
    pub delta: LinkDelta,
    /// `Note linked to: ...` status line.
    pub message: String,
}

impl LinkedNote {
    pub fn notable_ids(&self) -> BTreeSet<NotableId> {
        self.notables.iter().map(|notable| notable.id).collect()
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates `content`, resolves its references and saves the note with
    /// exactly the resolved link set.
    ///
    /// `note_id = None` creates a note at the end of the notebook's order.
    /// A missing notebook or note is reported before any content error.
    pub fn validate_and_link(
        &self,
        notebook_id: NotebookId,
        note_id: Option<NoteId>,
        content: &str,
    ) -> Result<LinkedNote, NoteServiceError> {
        if !self.repo.notebook_exists(notebook_id)? {
            return Err(NoteServiceError::NotebookNotFound(notebook_id));
        }
        if let Some(id) = note_id {
            if !self.repo.note_exists(notebook_id, id)? {
                return Err(NoteServiceError::NoteNotFound(id));
            }
        }

        let links = match resolve_links(&self.repo, notebook_id, content) {
            Ok(links) => links,
            Err(err) => {
                if let LinkError::Invalid(errors) = &err {
                    log::debug!(
                        "event=note_link module=service status=rejected notebook_id={} errors={}",
                        notebook_id,
                        errors.len()
                    );
                }
                return Err(err.into());
            }
        };
        let desired = links.ids();

        let (note, delta) = match note_id {
            None => {
                let note = self.repo.create_note(notebook_id, content, &desired)?;
                (note, LinkDelta::between(&BTreeSet::new(), &desired))
            }
            Some(id) => self.repo.update_note(notebook_id, id, content, &desired)?,
        };

        log::info!(
            "event=note_link module=service status=ok notebook_id={} note_id={} linked={} unlinked={} total={}",
            notebook_id,
            note.id,
            delta.to_link.len(),
            delta.to_unlink.len(),
            desired.len()
        );

        let notables = links.into_notables();
        Ok(LinkedNote {
            message: link_status_message(&notables),
            note,
            notables,
            delta,
        })
    }

    pub fn create_note(
        &self,
        notebook_id: NotebookId,
        content: &str,
    ) -> Result<LinkedNote, NoteServiceError> {
        self.validate_and_link(notebook_id, None, content)
    }

    /// Replaces content fully and re-links. Order index is kept.
    pub fn update_note(
        &self,
        notebook_id: NotebookId,
        note_id: NoteId,
        content: &str,
    ) -> Result<LinkedNote, NoteServiceError> {
        self.validate_and_link(notebook_id, Some(note_id), content)
    }

    pub fn get_note(
        &self,
        notebook_id: NotebookId,
        note_id: NoteId,
    ) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(notebook_id, note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))
    }

    /// Notables the note currently links to, by order index.
    pub fn linked_notables(
        &self,
        notebook_id: NotebookId,
        note_id: NoteId,
    ) -> Result<Vec<Notable>, NoteServiceError> {
        self.get_note(notebook_id, note_id)?;
        Ok(self.repo.linked_notables(notebook_id, note_id)?)
    }

    pub fn list_notes(&self, notebook_id: NotebookId) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes(notebook_id)?)
    }

    /// Notes that reference no notable at all.
    pub fn list_unlinked_notes(
        &self,
        notebook_id: NotebookId,
    ) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_unlinked_notes(notebook_id)?)
    }

    /// Notes that reference one notable, by order index.
    pub fn list_notes_for_notable(
        &self,
        notebook_id: NotebookId,
        notable_id: NotableId,
    ) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes_for_notable(notebook_id, notable_id)?)
    }

    /// Deletes one note and its links. Linked notables are kept.
    pub fn delete_note(
        &self,
        notebook_id: NotebookId,
        note_id: NoteId,
    ) -> Result<(), NoteServiceError> {
        self.repo.delete_note(notebook_id, note_id)?;
        log::info!(
            "event=note_delete module=service status=ok notebook_id={} note_id={}",
            notebook_id,
            note_id
        );
        Ok(())
    }
}
