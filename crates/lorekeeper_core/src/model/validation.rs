//! Field-level validation errors shared by all records.
//!
//! # Responsibility
//! - Describe user-correctable input problems per field.
//! - Render stable full messages for the transport layer.
//!
//! # Invariants
//! - Validation collects every problem; callers never see a partial list.
//! - A per-kind reference failure is reported once, however many tokens fail.

use crate::model::notable::NotableKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record field a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Content,
    Name,
    Summary,
    Characters,
    Items,
    Locations,
}

impl Field {
    /// Human-readable attribute label used as the full-message prefix.
    pub fn label(self) -> &'static str {
        match self {
            Self::Content => "Content",
            Self::Name => "Name",
            Self::Summary => "Summary",
            Self::Characters => "Characters",
            Self::Items => "Items",
            Self::Locations => "Locations",
        }
    }

    /// Reference field holding links of the given notable kind.
    pub fn for_kind(kind: NotableKind) -> Self {
        match kind {
            NotableKind::Character => Self::Characters,
            NotableKind::Item => Self::Items,
            NotableKind::Location => Self::Locations,
        }
    }
}

/// One user-correctable validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required value is missing or whitespace only.
    Blank(Field),
    /// Value is shorter than `min` characters.
    TooShort { field: Field, min: usize },
    /// Value is longer than `max` characters.
    TooLong { field: Field, max: usize },
    /// Content holds `[` or `]` outside any reference token.
    SquareBrackets,
    /// At least one reference of this kind did not resolve inside the notebook.
    ForeignReference(NotableKind),
}

impl ValidationError {
    /// Field this error belongs to.
    pub fn field(&self) -> Field {
        match self {
            Self::Blank(field) => *field,
            Self::TooShort { field, .. } => *field,
            Self::TooLong { field, .. } => *field,
            Self::SquareBrackets => Field::Content,
            Self::ForeignReference(kind) => Field::for_kind(*kind),
        }
    }

    /// Message without the field label.
    pub fn message(&self) -> String {
        match self {
            Self::Blank(_) => "can't be blank".to_string(),
            Self::TooShort { min, .. } => {
                format!("is too short (minimum is {min} characters)")
            }
            Self::TooLong { max, .. } => format!("is too long (maximum is {max} characters)"),
            Self::SquareBrackets => "cannot include square bracket characters".to_string(),
            Self::ForeignReference(_) => "must be from this notebook".to_string(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field().label(), self.message())
    }
}

impl Error for ValidationError {}

/// Ordered collection of validation errors for one save attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one error; an identical error already present is not repeated.
    pub fn push(&mut self, error: ValidationError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.errors.contains(error)
    }

    /// Errors attached to one field.
    pub fn on(&self, field: Field) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|error| error.field() == field)
            .collect()
    }

    /// Full messages such as `Characters must be from this notebook`.
    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Converts into `Err(self)` when any error was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(value: ValidationError) -> Self {
        Self {
            errors: vec![value],
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

impl Error for ValidationErrors {}

/// Checks a required text value against optional length bounds.
///
/// Lengths are counted in characters, not bytes.
pub(crate) fn check_text(
    errors: &mut ValidationErrors,
    field: Field,
    value: &str,
    min: Option<usize>,
    max: Option<usize>,
) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Blank(field));
    }
    check_length(errors, field, value, min, max);
}

/// Checks length bounds only; an empty value is allowed unless `min` rejects it.
pub(crate) fn check_length(
    errors: &mut ValidationErrors,
    field: Field,
    value: &str,
    min: Option<usize>,
    max: Option<usize>,
) {
    let length = value.chars().count();
    if let Some(min) = min {
        if length < min {
            errors.push(ValidationError::TooShort { field, min });
        }
    }
    if let Some(max) = max {
        if length > max {
            errors.push(ValidationError::TooLong { field, max });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{check_text, Field, ValidationError, ValidationErrors};
    use crate::model::notable::NotableKind;

    #[test]
    fn full_messages_prefix_field_label() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::SquareBrackets);
        errors.push(ValidationError::ForeignReference(NotableKind::Character));

        assert_eq!(
            errors.full_messages(),
            vec![
                "Content cannot include square bracket characters".to_string(),
                "Characters must be from this notebook".to_string(),
            ]
        );
    }

    #[test]
    fn push_ignores_duplicate_errors() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::ForeignReference(NotableKind::Item));
        errors.push(ValidationError::ForeignReference(NotableKind::Item));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn blank_value_reports_blank_and_too_short() {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, Field::Content, "", Some(5), Some(1000));
        assert_eq!(
            errors.full_messages(),
            vec![
                "Content can't be blank".to_string(),
                "Content is too short (minimum is 5 characters)".to_string(),
            ]
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, Field::Name, "ééééé", None, Some(5));
        assert!(errors.is_empty());
    }
}
