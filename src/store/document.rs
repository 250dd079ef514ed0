//! Document - persisted per-node state at the store boundary
//!
//! A document carries, per property, a local map from revision to value.
//! Entries made under branch revisions are staged and never trunk-visible;
//! entries made under trunk revisions become visible once their revision is
//! marked committed. This split is what makes crash recovery a discard pass:
//! staged work simply never reaches the trunk-visible part of a document.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::revision::Revision;

/// Derives a document id from a content path: `<depth>:<path>`.
///
/// The root path `/` has depth 0; every further path segment adds one.
pub fn path_to_id(path: &str) -> String {
    let depth = if path == "/" {
        0
    } else {
        path.matches('/').count()
    };
    format!("{}:{}", depth, path)
}

/// One persisted document: per-property local maps plus the set of
/// trunk-committed revisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    /// Per property: revision -> value (`None` records a removal).
    properties: BTreeMap<String, BTreeMap<Revision, Option<Value>>>,
    /// Trunk revisions whose changes have been durably committed.
    committed: BTreeSet<Revision>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
            committed: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The pending per-revision changes for one property, if any exist.
    pub fn local_map(&self, property: &str) -> Option<&BTreeMap<Revision, Option<Value>>> {
        self.properties.get(property)
    }

    /// Records a property change at the given revision.
    pub fn set_local(&mut self, property: &str, revision: Revision, value: Option<Value>) {
        self.properties
            .entry(property.to_string())
            .or_default()
            .insert(revision, value);
    }

    /// Marks a trunk revision as durably committed.
    pub fn mark_committed(&mut self, revision: Revision) {
        self.committed.insert(revision);
    }

    /// True if the revision's changes are part of trunk history.
    pub fn is_committed(&self, revision: Revision) -> bool {
        !revision.is_branch() && self.committed.contains(&revision)
    }

    /// The trunk-visible value of a property: the newest committed,
    /// non-branch entry. Branch-scoped entries are never visible here,
    /// whatever their revision order.
    pub fn visible_value(&self, property: &str) -> Option<&Value> {
        let local = self.properties.get(property)?;
        local
            .iter()
            .rev()
            .find(|(revision, _)| self.is_committed(**revision))
            .and_then(|(_, value)| value.as_ref())
    }

    /// Every branch revision appearing in any local map of this document.
    pub fn branch_revisions(&self) -> BTreeSet<Revision> {
        self.properties
            .values()
            .flat_map(|local| local.keys())
            .filter(|revision| revision.is_branch())
            .copied()
            .collect()
    }

    /// Removes every local-map entry recorded under one of `revisions`.
    /// Returns the number of entries removed; empty property maps are
    /// dropped.
    pub fn strip_revisions(&mut self, revisions: &BTreeSet<Revision>) -> usize {
        let mut removed = 0;
        self.properties.retain(|_, local| {
            let before = local.len();
            local.retain(|revision, _| !revisions.contains(revision));
            removed += before - local.len();
            !local.is_empty()
        });
        removed
    }

    /// True if the document carries no local entries at all.
    pub fn is_blank(&self) -> bool {
        self.properties.is_empty()
    }
}
