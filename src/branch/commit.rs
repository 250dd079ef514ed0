//! BranchCommit - one staged change within a branch
//!
//! A branch commit records which content paths a single staged change
//! touched. It never leaves its owning branch, and its revision is always
//! branch-flagged.
//!
//! Rebase boundaries are commits too: they carry the replacement base
//! vector but never track paths of their own, so the accumulated path set
//! at a boundary equals the set at the commit immediately before it.

use std::collections::BTreeSet;

use crate::revision::{Revision, RevisionVector};

/// What kind of chain entry a commit is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitKind {
    /// A regular staged change; accumulates tracked paths.
    Staged,
    /// A rebase boundary: replaces the branch base for all later commits.
    Rebase { base: RevisionVector },
}

/// One staged change within a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCommit {
    revision: Revision,
    paths: BTreeSet<String>,
    kind: CommitKind,
}

impl BranchCommit {
    /// Creates an empty staged commit at the given branch revision.
    pub(crate) fn staged(revision: Revision) -> Self {
        Self {
            revision,
            paths: BTreeSet::new(),
            kind: CommitKind::Staged,
        }
    }

    /// Creates a rebase boundary carrying the replacement base.
    pub(crate) fn rebase(revision: Revision, base: RevisionVector) -> Self {
        Self {
            revision,
            paths: BTreeSet::new(),
            kind: CommitKind::Rebase { base },
        }
    }

    /// The branch-flagged revision naming this commit.
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// True if this commit is a rebase boundary.
    pub fn is_rebase(&self) -> bool {
        matches!(self.kind, CommitKind::Rebase { .. })
    }

    /// The replacement base, for rebase boundaries.
    pub fn rebase_base(&self) -> Option<&RevisionVector> {
        match &self.kind {
            CommitKind::Rebase { base } => Some(base),
            CommitKind::Staged => None,
        }
    }

    /// The content paths this commit modified, in path order.
    pub fn tracked_paths(&self) -> &BTreeSet<String> {
        &self.paths
    }

    /// Records a modified path. Idempotent; returns true if the path was
    /// not already tracked.
    pub(crate) fn track(&mut self, path: &str) -> bool {
        self.paths.insert(path.to_string())
    }
}
