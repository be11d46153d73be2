//! Reference resolution and link-set computation for note content.
//!
//! # Responsibility
//! - Run content checks (presence, length, stray brackets).
//! - Resolve every scanned reference token against the notebook.
//! - Produce the deduplicated notable set a note must be linked to.
//!
//! # Invariants
//! - Nothing here writes. Persistence happens in `repo::note_repo` only after
//!   [`resolve_links`] returned `Ok`.
//! - A token resolves only to a notable of its own kind in the same notebook.
//!   Missing and foreign ids fail identically.
//! - At most one resolution error is reported per kind.

use crate::model::notable::Notable;
use crate::model::note::validate_note_content;
use crate::model::validation::{ValidationError, ValidationErrors};
use crate::model::{NotableId, NotebookId};
use crate::reference::scanner::{ReferenceScan, ReferenceToken};
use crate::reference::validator::validate_brackets;
use crate::repo::notable_repo::NotableLookup;
use crate::repo::{RepoError, RepoResult};
use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure while checking content and resolving its references.
#[derive(Debug)]
pub enum LinkError {
    /// User-correctable content or reference errors, collected together.
    Invalid(ValidationErrors),
    /// Lookup storage failure.
    Repo(RepoError),
}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LinkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for LinkError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Resolves single reference tokens within one notebook.
pub struct LinkResolver<'l, L: NotableLookup + ?Sized> {
    lookup: &'l L,
}

impl<'l, L: NotableLookup + ?Sized> LinkResolver<'l, L> {
    pub fn new(lookup: &'l L) -> Self {
        Self { lookup }
    }

    /// Returns `Ok(None)` when the token does not name a notable of its kind
    /// in `notebook_id`, including ids too large to be stored.
    pub fn resolve(
        &self,
        notebook_id: NotebookId,
        token: &ReferenceToken<'_>,
    ) -> RepoResult<Option<Notable>> {
        match token.notable_id() {
            Some(id) => self.lookup.find_notable(notebook_id, token.kind, id),
            None => Ok(None),
        }
    }
}

/// Notables a note's content links to, deduplicated, in order of first
/// appearance in the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLinks {
    notables: Vec<Notable>,
}

impl ResolvedLinks {
    pub fn notables(&self) -> &[Notable] {
        &self.notables
    }

    pub fn into_notables(self) -> Vec<Notable> {
        self.notables
    }

    pub fn ids(&self) -> BTreeSet<NotableId> {
        self.notables.iter().map(|notable| notable.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notables.is_empty()
    }
}

/// Checks `content` and resolves all of its references in `notebook_id`.
///
/// Content checks run first and short-circuit. Resolution then visits every
/// token of every kind so that all per-kind errors are reported at once.
pub fn resolve_links<L: NotableLookup + ?Sized>(
    lookup: &L,
    notebook_id: NotebookId,
    content: &str,
) -> Result<ResolvedLinks, LinkError> {
    let mut errors = validate_note_content(content);
    if let Err(err) = validate_brackets(content) {
        errors.push(err);
    }
    if !errors.is_empty() {
        return Err(LinkError::Invalid(errors));
    }

    let resolver = LinkResolver::new(lookup);
    let mut found: Vec<(usize, Notable)> = Vec::new();
    for token in ReferenceScan::new(content).all() {
        match resolver.resolve(notebook_id, &token)? {
            Some(notable) => found.push((token.start, notable)),
            None => errors.push(ValidationError::ForeignReference(token.kind)),
        }
    }
    if !errors.is_empty() {
        return Err(LinkError::Invalid(errors));
    }

    found.sort_by_key(|(start, _)| *start);
    let mut seen = HashSet::new();
    let notables = found
        .into_iter()
        .map(|(_, notable)| notable)
        .filter(|notable| seen.insert(notable.id))
        .collect();
    Ok(ResolvedLinks { notables })
}

/// Status line shown after a successful save.
pub fn link_status_message(notables: &[Notable]) -> String {
    if notables.is_empty() {
        return "Note linked to no notables".to_string();
    }
    let names: Vec<&str> = notables.iter().map(|notable| notable.name.as_str()).collect();
    format!("Note linked to: {}", names.join(", "))
}
