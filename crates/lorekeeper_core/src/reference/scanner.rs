//! Reference token scanner.
//!
//! Scanning is a pure re-computation over the whole content on every call;
//! iterators borrow the content and can be restarted freely.

use crate::model::notable::NotableKind;
use crate::model::NotableId;
use crate::reference::grammar::token_pattern;

/// One reference token found in note content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceToken<'c> {
    pub kind: NotableKind,
    /// Full token text, e.g. `@[Bob](@5)`.
    pub raw: &'c str,
    /// Display name between the brackets.
    pub name: &'c str,
    /// Id digits after the second trigger.
    pub id: &'c str,
    /// Byte offset of the first token character.
    pub start: usize,
    /// Byte offset one past the closing `)`.
    pub end: usize,
}

impl ReferenceToken<'_> {
    /// Parsed id; `None` when the digits overflow the id type.
    pub fn notable_id(&self) -> Option<NotableId> {
        self.id.parse().ok()
    }
}

/// Scanner over one content string.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceScan<'c> {
    content: &'c str,
}

impl<'c> ReferenceScan<'c> {
    pub fn new(content: &'c str) -> Self {
        Self { content }
    }

    /// Tokens of one kind in content order. Duplicates are preserved.
    pub fn tokens(&self, kind: NotableKind) -> impl Iterator<Item = ReferenceToken<'c>> + 'c {
        token_pattern(kind)
            .captures_iter(self.content)
            .filter_map(move |caps| {
                let whole = caps.get(0)?;
                Some(ReferenceToken {
                    kind,
                    raw: whole.as_str(),
                    name: caps.name("name")?.as_str(),
                    id: caps.name("id")?.as_str(),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
    }

    /// Tokens of every kind: characters, then items, then locations.
    pub fn all(&self) -> impl Iterator<Item = ReferenceToken<'c>> + 'c {
        let scan = *self;
        NotableKind::ALL
            .into_iter()
            .flat_map(move |kind| scan.tokens(kind))
    }
}
