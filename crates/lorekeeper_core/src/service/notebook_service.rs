//! Notebook use-case service.
//!
//! Every call is scoped to an already-authenticated owner; notebooks of other
//! owners behave as missing.

use crate::model::notebook::{Notebook, NotebookDraft};
use crate::model::validation::ValidationErrors;
use crate::model::{NotebookId, UserId};
use crate::repo::notebook_repo::NotebookRepository;
use crate::repo::{RecordRef, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for notebook use-cases.
#[derive(Debug)]
pub enum NotebookServiceError {
    Invalid(ValidationErrors),
    NotebookNotFound(NotebookId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NotebookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "invalid notebook: {errors}"),
            Self::NotebookNotFound(id) => write!(f, "notebook not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotebookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NotebookServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(RecordRef::Notebook(id)) => Self::NotebookNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for NotebookServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

/// Notebook service facade over repository implementations.
pub struct NotebookService<R: NotebookRepository> {
    repo: R,
}

impl<R: NotebookRepository> NotebookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_notebook(
        &self,
        owner_id: UserId,
        draft: NotebookDraft,
    ) -> Result<Notebook, NotebookServiceError> {
        draft.validate()?;
        Ok(self.repo.create_notebook(owner_id, &draft)?)
    }

    pub fn get_notebook(
        &self,
        owner_id: UserId,
        id: NotebookId,
    ) -> Result<Notebook, NotebookServiceError> {
        self.repo
            .get_notebook(owner_id, id)?
            .ok_or(NotebookServiceError::NotebookNotFound(id))
    }

    /// The owner's notebooks by order index.
    pub fn list_notebooks(&self, owner_id: UserId) -> Result<Vec<Notebook>, NotebookServiceError> {
        Ok(self.repo.list_notebooks(owner_id)?)
    }

    pub fn update_notebook(
        &self,
        owner_id: UserId,
        id: NotebookId,
        draft: NotebookDraft,
    ) -> Result<Notebook, NotebookServiceError> {
        draft.validate()?;
        Ok(self.repo.update_notebook(owner_id, id, &draft)?)
    }

    /// Deletes the notebook and all of its notes, notables and links.
    pub fn delete_notebook(
        &self,
        owner_id: UserId,
        id: NotebookId,
    ) -> Result<(), NotebookServiceError> {
        self.repo.delete_notebook(owner_id, id)?;
        log::info!(
            "event=notebook_delete module=service status=ok notebook_id={}",
            id
        );
        Ok(())
    }
}
