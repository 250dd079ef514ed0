//! RevisionVector - per-node latest-revision snapshot
//!
//! A revision vector holds at most one revision per cluster node and states
//! "as of this snapshot, the latest visible revision from each node". It is
//! the causal-order carrier of the system: branches take one as their base,
//! readers take one as their timestamp.
//!
//! Immutable once constructed. Every operation that would change a vector
//! returns a new one.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::RevisionParseError;
use super::Revision;

/// An immutable snapshot of the latest known revision per cluster node.
///
/// Entries are kept sorted by cluster id, so equality and iteration order
/// are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RevisionVector {
    revisions: Vec<Revision>,
}

impl RevisionVector {
    /// The empty vector: no node has been seen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a vector from arbitrary revisions. When several revisions
    /// share a cluster id, the largest wins.
    pub fn from_revisions<I: IntoIterator<Item = Revision>>(revisions: I) -> Self {
        let mut vector = Self::new();
        for revision in revisions {
            vector = vector.update(revision);
        }
        vector
    }

    /// The latest known revision from the given cluster node, if any.
    pub fn get(&self, cluster_id: u32) -> Option<Revision> {
        self.revisions
            .binary_search_by_key(&cluster_id, Revision::cluster_id)
            .ok()
            .map(|i| self.revisions[i])
    }

    /// Returns a new vector where the entry for `revision`'s cluster node is
    /// `revision`, unless the existing entry is already newer.
    pub fn update(&self, revision: Revision) -> Self {
        let mut revisions = self.revisions.clone();
        match revisions.binary_search_by_key(&revision.cluster_id(), Revision::cluster_id) {
            Ok(i) => {
                if revision > revisions[i] {
                    revisions[i] = revision;
                }
            }
            Err(i) => revisions.insert(i, revision),
        }
        Self { revisions }
    }

    /// Returns a new vector without the entry for the given cluster node.
    pub fn remove(&self, cluster_id: u32) -> Self {
        let mut revisions = self.revisions.clone();
        if let Ok(i) = revisions.binary_search_by_key(&cluster_id, Revision::cluster_id) {
            revisions.remove(i);
        }
        Self { revisions }
    }

    /// True if every component of `other` is covered by this vector: for
    /// each of `other`'s entries, this vector has an entry from the same
    /// node that is at least as new. A component missing from this vector
    /// means the node was never seen, so it cannot dominate.
    pub fn dominates(&self, other: &RevisionVector) -> bool {
        other.revisions.iter().all(|theirs| {
            self.get(theirs.cluster_id())
                .is_some_and(|ours| ours >= *theirs)
        })
    }

    /// Component-wise maximum of the two vectors.
    pub fn pmax(&self, other: &RevisionVector) -> Self {
        let mut merged = self.clone();
        for revision in &other.revisions {
            merged = merged.update(*revision);
        }
        merged
    }

    /// True if any component is a branch revision.
    pub fn is_branch(&self) -> bool {
        self.revisions.iter().any(Revision::is_branch)
    }

    /// The branch revision carried by this vector, if any. A well-formed
    /// base vector carries at most one.
    pub fn branch_revision(&self) -> Option<Revision> {
        self.revisions.iter().copied().find(Revision::is_branch)
    }

    /// Iterates entries in cluster-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.iter()
    }

    /// Number of cluster nodes represented.
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// True if no node has been seen.
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

impl From<Revision> for RevisionVector {
    fn from(revision: Revision) -> Self {
        Self {
            revisions: vec![revision],
        }
    }
}

impl PartialOrd for RevisionVector {
    /// The dominance partial order. `None` means the vectors are concurrent:
    /// neither snapshot covers the other.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.dominates(other), other.dominates(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Greater),
            (false, true) => Some(Ordering::Less),
            (false, false) => None,
        }
    }
}

impl fmt::Display for RevisionVector {
    /// Formats as the comma-joined revision literals, in cluster-id order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, revision) in self.revisions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", revision)?;
        }
        Ok(())
    }
}

impl FromStr for RevisionVector {
    type Err = RevisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::new());
        }
        let mut vector = Self::new();
        for literal in s.split(',') {
            let revision: Revision = literal.parse()?;
            if vector.get(revision.cluster_id()).is_some() {
                return Err(RevisionParseError::DuplicateClusterId {
                    cluster_id: revision.cluster_id(),
                });
            }
            vector = vector.update(revision);
        }
        Ok(vector)
    }
}

impl Serialize for RevisionVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RevisionVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(D::Error::custom)
    }
}
