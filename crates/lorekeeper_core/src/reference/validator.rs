//! Square-bracket well-formedness check for note content.
//!
//! Every `[` and `]` must sit inside a recognized reference token. Coverage is
//! measured against the original content, so tokens of different kinds are
//! checked independently of each other.

use crate::model::validation::ValidationError;
use crate::reference::scanner::ReferenceScan;

/// Byte offset of the first bracket not covered by any reference token.
pub fn find_stray_bracket(content: &str) -> Option<usize> {
    let spans: Vec<(usize, usize)> = ReferenceScan::new(content)
        .all()
        .map(|token| (token.start, token.end))
        .collect();

    content
        .char_indices()
        .filter(|(_, ch)| matches!(ch, '[' | ']'))
        .map(|(offset, _)| offset)
        .find(|offset| {
            !spans
                .iter()
                .any(|(start, end)| *start <= *offset && *offset < *end)
        })
}

pub fn validate_brackets(content: &str) -> Result<(), ValidationError> {
    match find_stray_bracket(content) {
        Some(_) => Err(ValidationError::SquareBrackets),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{find_stray_bracket, validate_brackets};
    use crate::model::validation::ValidationError;

    #[test]
    fn plain_text_passes() {
        assert!(validate_brackets("no references here (really)").is_ok());
    }

    #[test]
    fn brackets_inside_tokens_pass() {
        assert!(validate_brackets("Say hi to @[Bob](@5) at #[Keep](#12)").is_ok());
    }

    #[test]
    fn stray_brackets_fail() {
        assert_eq!(
            validate_brackets("A[weird] bracket"),
            Err(ValidationError::SquareBrackets)
        );
        assert_eq!(find_stray_bracket("A[weird] bracket"), Some(1));
    }

    #[test]
    fn unterminated_reference_fails() {
        assert!(validate_brackets("Say hi to @[Bob](@5").is_err());
        assert!(validate_brackets("Say hi to @[Bob]").is_err());
    }

    #[test]
    fn open_bracket_inside_name_is_covered() {
        assert!(validate_brackets("@[Bob [the tall](@5)").is_ok());
    }

    #[test]
    fn removing_one_kind_does_not_splice_another() {
        // Removing the item token would leave `@[x](@1)`, which is not a real token.
        assert!(validate_brackets("@[x](@:[s](:9)1)").is_err());
    }

    #[test]
    fn stray_bracket_after_valid_token_fails() {
        assert!(validate_brackets(":[Sword](:9) ]").is_err());
    }
}
