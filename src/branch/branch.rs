//! Branch - a writer-local chain of staged commits
//!
//! A branch is an ordered chain of `BranchCommit`s sharing a base
//! `RevisionVector`. It answers "what changed up to point X" without
//! re-scanning persisted storage, which is exactly what merge-time conflict
//! detection asks, repeatedly, while the chain may still be growing.
//!
//! # Invariants Enforced
//!
//! - The chain is strictly ordered; every commit revision is branch-flagged
//! - A failed mutation leaves no partial state behind
//! - Pre-rebase query results never change when the base is replaced
//! - A branch is logically owned by one writer; the registry only reads
//!
//! The handle is shared between the writer session and the unmerged-branch
//! registry, so chain state sits behind a `RwLock`. Concurrent mutation of
//! the same branch is not a supported pattern; callers serialize externally.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::revision::{Revision, RevisionVector};

use super::commit::BranchCommit;
use super::errors::{BranchError, BranchResult};
use super::unmerged::BranchIndex;

struct BranchInner {
    /// The commit chain, keyed and ordered by revision.
    commits: BTreeMap<Revision, BranchCommit>,
}

/// An ordered, uncommitted sequence of staged changes built on a base
/// revision vector.
///
/// Created only through `UnmergedBranches::create`, which seeds the chain
/// with one empty commit and registers every chain revision for lookup.
pub struct Branch {
    /// Base at creation time; superseded by rebase boundaries in the chain.
    initial_base: RevisionVector,
    /// Back-reference for lookup only, never for lifetime.
    parent: Option<Weak<Branch>>,
    /// Registry index; weak so a closed registry never leaks branches.
    index: Weak<BranchIndex>,
    /// Self-reference handed to the index when new revisions are staged.
    me: Weak<Branch>,
    /// Set once by `remove_branch`; a removed branch accepts no mutations.
    removed: AtomicBool,
    inner: RwLock<BranchInner>,
}

impl Branch {
    pub(crate) fn new_cyclic(
        base: RevisionVector,
        first_revision: Revision,
        parent: Option<&Arc<Branch>>,
        index: Weak<BranchIndex>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| {
            let mut commits = BTreeMap::new();
            commits.insert(first_revision, BranchCommit::staged(first_revision));
            Self {
                initial_base: base,
                parent: parent.map(Arc::downgrade),
                index,
                me: me.clone(),
                removed: AtomicBool::new(false),
                inner: RwLock::new(BranchInner { commits }),
            }
        })
    }

    fn read(&self) -> BranchResult<std::sync::RwLockReadGuard<'_, BranchInner>> {
        self.inner
            .read()
            .map_err(|_| BranchError::Internal("Lock poisoned".into()))
    }

    fn write(&self) -> BranchResult<std::sync::RwLockWriteGuard<'_, BranchInner>> {
        self.inner
            .write()
            .map_err(|_| BranchError::Internal("Lock poisoned".into()))
    }

    /// Appends a chain entry after validating order and registry ownership.
    /// Shared by `add_commit` and `rebase`; the chain is only touched once
    /// every fallible step has passed.
    fn append(&self, commit: BranchCommit) -> BranchResult<()> {
        let revision = commit.revision();
        if !revision.is_branch() {
            return Err(BranchError::NotBranchRevision(revision));
        }

        let mut inner = self.write()?;
        if self.removed.load(Ordering::SeqCst) {
            return Err(BranchError::BranchRemoved);
        }
        if let Some((&chain_end, _)) = inner.commits.iter().next_back() {
            if revision <= chain_end {
                return Err(BranchError::OutOfOrder {
                    revision,
                    chain_end,
                });
            }
        }

        // Claim the revision in the registry before mutating the chain, so a
        // collision with another live branch leaves this chain untouched.
        if let Some(index) = self.index.upgrade() {
            let me = self
                .me
                .upgrade()
                .ok_or_else(|| BranchError::Internal("Branch self-reference gone".into()))?;
            index.claim(revision, &me)?;
        }

        inner.commits.insert(revision, commit);
        Ok(())
    }

    /// Appends a new staged commit to the end of the chain.
    ///
    /// The revision must be branch-flagged and sort after every existing
    /// commit. Returns a snapshot of the new, still-empty commit.
    pub fn add_commit(&self, revision: Revision) -> BranchResult<BranchCommit> {
        self.append(BranchCommit::staged(revision))?;
        Ok(BranchCommit::staged(revision))
    }

    /// Introduces a rebase boundary at `revision` and replaces the branch
    /// base with `new_base` for every later commit.
    ///
    /// The boundary tracks no paths of its own, so the accumulated modified
    /// paths at the boundary equal those of the commit immediately before
    /// it, and all pre-rebase query results are preserved.
    pub fn rebase(&self, revision: Revision, new_base: RevisionVector) -> BranchResult<()> {
        self.append(BranchCommit::rebase(revision, new_base))
    }

    /// Exact commit lookup. Rebase boundaries are real chain entries and are
    /// returned like any other commit.
    pub fn get_commit(&self, revision: Revision) -> BranchResult<BranchCommit> {
        self.read()?
            .commits
            .get(&revision)
            .cloned()
            .ok_or(BranchError::CommitNotFound(revision))
    }

    /// Records that the commit at `revision` modified `path`. Idempotent.
    ///
    /// Fails with `RebaseCommit` on a rebase boundary: boundaries are
    /// read-only markers.
    pub fn track(&self, revision: Revision, path: &str) -> BranchResult<()> {
        let mut inner = self.write()?;
        let commit = inner
            .commits
            .get_mut(&revision)
            .ok_or(BranchError::CommitNotFound(revision))?;
        if commit.is_rebase() {
            return Err(BranchError::RebaseCommit(revision));
        }
        commit.track(path);
        Ok(())
    }

    /// The union of tracked paths over every commit from the start of the
    /// chain up to and including `revision`.
    ///
    /// Fails with `ForeignRevision` for any revision this branch did not
    /// itself produce; a silent empty set would mask a caller bug.
    pub fn modified_paths_until(&self, revision: Revision) -> BranchResult<BTreeSet<String>> {
        let inner = self.read()?;
        if !inner.commits.contains_key(&revision) {
            return Err(BranchError::ForeignRevision(revision));
        }
        let mut paths = BTreeSet::new();
        for commit in inner.commits.range(..=revision).map(|(_, c)| c) {
            paths.extend(commit.tracked_paths().iter().cloned());
        }
        Ok(paths)
    }

    /// The base currently in effect: the most recent rebase boundary's base,
    /// or the creation base if the branch was never rebased.
    pub fn base(&self) -> RevisionVector {
        match self.read() {
            Ok(inner) => inner
                .commits
                .values()
                .rev()
                .find_map(|c| c.rebase_base().cloned())
                .unwrap_or_else(|| self.initial_base.clone()),
            // A poisoned chain lock cannot invalidate the immutable creation
            // base; fall back to it.
            Err(_) => self.initial_base.clone(),
        }
    }

    /// The base in effect at a specific chain position: the nearest rebase
    /// boundary at or before `revision`.
    pub fn base_at(&self, revision: Revision) -> BranchResult<RevisionVector> {
        let inner = self.read()?;
        if !inner.commits.contains_key(&revision) {
            return Err(BranchError::ForeignRevision(revision));
        }
        Ok(inner
            .commits
            .range(..=revision)
            .rev()
            .find_map(|(_, c)| c.rebase_base().cloned())
            .unwrap_or_else(|| self.initial_base.clone()))
    }

    /// True if `revision` is one of this branch's own chain entries.
    pub fn contains(&self, revision: Revision) -> bool {
        self.read()
            .map(|inner| inner.commits.contains_key(&revision))
            .unwrap_or(false)
    }

    /// Every chain revision, in chain order.
    pub fn commit_revisions(&self) -> Vec<Revision> {
        self.read()
            .map(|inner| inner.commits.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of chain entries, rebase boundaries included.
    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.commits.len()).unwrap_or(0)
    }

    /// A branch always holds at least its initial commit.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The parent branch, if it is still alive. Lookup only; a parent is
    /// never kept alive through its children.
    pub fn parent(&self) -> Option<Arc<Branch>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Marks the branch removed and returns its chain revisions, atomically
    /// with respect to appends: an in-flight append either finished before
    /// detach (and its revision is returned) or observes the removed flag.
    /// A second detach returns nothing.
    pub(crate) fn detach(&self) -> BranchResult<Vec<Revision>> {
        let inner = self.write()?;
        if self.removed.swap(true, Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(inner.commits.keys().copied().collect())
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Branch")
            .field("initial_base", &self.initial_base)
            .field("commits", &self.commit_revisions())
            .field("removed", &self.is_removed())
            .finish()
    }
}
