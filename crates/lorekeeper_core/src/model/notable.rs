//! Notable domain model.
//!
//! # Responsibility
//! - Define the closed set of notable kinds and their reference triggers.
//! - Validate notable drafts before persistence.
//!
//! # Invariants
//! - `kind` is one of Character/Item/Location and never changes after creation.
//! - `order_index` is assigned once at creation from the notebook-wide
//!   sequence shared by all three kinds.

use crate::model::validation::{check_text, Field, ValidationErrors};
use crate::model::{NotableId, NotebookId};
use crate::reference::grammar;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Kind of a notable. Each kind owns one reference trigger character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotableKind {
    Character,
    Item,
    Location,
}

impl NotableKind {
    /// All kinds in scanning order.
    pub const ALL: [NotableKind; 3] = [Self::Character, Self::Item, Self::Location];

    /// Trigger character opening and closing this kind's reference token.
    pub fn trigger(self) -> char {
        match self {
            Self::Character => '@',
            Self::Item => ':',
            Self::Location => '#',
        }
    }

    pub fn from_trigger(trigger: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.trigger() == trigger)
    }

    /// Stored/serialized kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Item => "Item",
            Self::Location => "Location",
        }
    }
}

impl Display for NotableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a kind name is not one of the three supported kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNotableKind(pub String);

impl Display for UnknownNotableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Type must be one of Item/Character/Location (got `{}`)", self.0)
    }
}

impl Error for UnknownNotableKind {}

impl FromStr for NotableKind {
    type Err = UnknownNotableKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Character" => Ok(Self::Character),
            "Item" => Ok(Self::Item),
            "Location" => Ok(Self::Location),
            other => Err(UnknownNotableKind(other.to_string())),
        }
    }
}

/// Persisted notable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notable {
    pub id: NotableId,
    pub notebook_id: NotebookId,
    /// Serialized as `type` to match the stored column.
    #[serde(rename = "type")]
    pub kind: NotableKind,
    pub name: String,
    pub description: Option<String>,
    pub order_index: i64,
    /// Epoch milliseconds of the last detail view.
    pub viewed_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Notable {
    /// Reference token that links a note to this notable, e.g. `@[Bob](@5)`.
    pub fn text_code(&self) -> String {
        grammar::text_code(self.kind, &self.name, self.id)
    }
}

/// Input for creating one notable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotableDraft {
    pub kind: NotableKind,
    pub name: String,
    pub description: Option<String>,
}

impl NotableDraft {
    pub fn new(kind: NotableKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_notable_fields(&self.name)
    }
}

/// Editable notable attributes. Kind and order index are not editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotableChanges {
    pub name: String,
    pub description: Option<String>,
}

impl NotableChanges {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_notable_fields(&self.name)
    }
}

fn validate_notable_fields(name: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_text(&mut errors, Field::Name, name, None, None);
    errors.into_result()
}
