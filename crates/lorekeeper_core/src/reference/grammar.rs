//! Reference token grammar.
//!
//! A reference is `T[Name](Tid)` where `T` is the kind trigger, `Name` is any
//! text without `]` and `id` is one or more ASCII digits. Only the id is
//! load-bearing; the name is display text.

use crate::model::notable::NotableKind;
use crate::model::NotableId;
use once_cell::sync::Lazy;
use regex::Regex;

static CHARACTER_TOKEN_RE: Lazy<Regex> = Lazy::new(|| token_regex(NotableKind::Character));
static ITEM_TOKEN_RE: Lazy<Regex> = Lazy::new(|| token_regex(NotableKind::Item));
static LOCATION_TOKEN_RE: Lazy<Regex> = Lazy::new(|| token_regex(NotableKind::Location));

fn token_regex(kind: NotableKind) -> Regex {
    let trigger = regex::escape(&kind.trigger().to_string());
    // `[0-9]` rather than `\d`: ids are ASCII digits only.
    Regex::new(&format!(
        r"{trigger}\[(?P<name>[^\]]+)\]\({trigger}(?P<id>[0-9]+)\)"
    ))
    .expect("valid reference token regex")
}

/// Compiled token pattern for one kind, with `name` and `id` capture groups.
pub fn token_pattern(kind: NotableKind) -> &'static Regex {
    match kind {
        NotableKind::Character => Lazy::force(&CHARACTER_TOKEN_RE),
        NotableKind::Item => Lazy::force(&ITEM_TOKEN_RE),
        NotableKind::Location => Lazy::force(&LOCATION_TOKEN_RE),
    }
}

/// Extracts the id digits from one well-formed token of `kind`.
///
/// Returns `None` when `token` is not exactly one well-formed token.
pub fn extract_id(token: &str, kind: NotableKind) -> Option<&str> {
    let trigger = kind.trigger();
    let rest = token.strip_prefix(trigger)?.strip_prefix('[')?;
    let close = rest.find("](")?;
    let name = &rest[..close];
    if name.is_empty() || name.contains(']') {
        return None;
    }

    let id = rest[close + 2..].strip_prefix(trigger)?.strip_suffix(')')?;
    if !id.is_empty() && id.bytes().all(|byte| byte.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

/// Renders the canonical token for a notable.
///
/// Names containing `]` cannot be expressed in the grammar; the rendered token
/// will not scan back.
pub fn text_code(kind: NotableKind, name: &str, id: NotableId) -> String {
    let trigger = kind.trigger();
    format!("{trigger}[{name}]({trigger}{id})")
}
