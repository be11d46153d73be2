//! Note↔notable link set and its delta.
//!
//! Links carry no attributes of their own. A note's link set is replaced by
//! applying the delta between the stored set and the set resolved from the
//! note's current content.

use crate::model::NotableId;
use std::collections::BTreeSet;

/// Links to remove and links to add so that `current` becomes `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDelta {
    pub to_unlink: BTreeSet<NotableId>,
    pub to_link: BTreeSet<NotableId>,
}

impl LinkDelta {
    /// Links present in both sets appear in neither side of the delta.
    pub fn between(current: &BTreeSet<NotableId>, desired: &BTreeSet<NotableId>) -> Self {
        Self {
            to_unlink: current.difference(desired).copied().collect(),
            to_link: desired.difference(current).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_unlink.is_empty() && self.to_link.is_empty()
    }
}
