//! Notebook domain model.
//!
//! # Invariants
//! - `owner_id` never changes after creation.
//! - `order_index` is unique across all notebooks of all owners.

use crate::model::validation::{check_length, check_text, Field, ValidationErrors};
use crate::model::{NotebookId, UserId};
use serde::{Deserialize, Serialize};

pub const NOTEBOOK_NAME_MAX_CHARS: usize = 45;
pub const NOTEBOOK_SUMMARY_MAX_CHARS: usize = 250;

/// Persisted notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: NotebookId,
    pub owner_id: UserId,
    pub name: String,
    pub summary: Option<String>,
    pub order_index: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating or updating one notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookDraft {
    pub name: String,
    pub summary: Option<String>,
}

impl NotebookDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(
            &mut errors,
            Field::Name,
            &self.name,
            None,
            Some(NOTEBOOK_NAME_MAX_CHARS),
        );
        if let Some(summary) = self.summary.as_deref() {
            check_length(
                &mut errors,
                Field::Summary,
                summary,
                None,
                Some(NOTEBOOK_SUMMARY_MAX_CHARS),
            );
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::NotebookDraft;

    #[test]
    fn summary_is_optional() {
        assert!(NotebookDraft::new("Campaign").validate().is_ok());
    }

    #[test]
    fn long_name_and_summary_are_both_reported() {
        let errors = NotebookDraft::new("0".repeat(46))
            .with_summary("0".repeat(251))
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.full_messages(),
            vec![
                "Name is too long (maximum is 45 characters)".to_string(),
                "Summary is too long (maximum is 250 characters)".to_string(),
            ]
        );
    }
}
