//! UnmergedBranches - registry of branches not yet merged into trunk
//!
//! Store-session-scoped shared state: populated as branches are created,
//! queried by revision from any session resolving conflict state, emptied of
//! a branch exactly once when it merges or is abandoned.
//!
//! The registry is a concurrent associative index keyed by revision. Every
//! chain revision of a live branch maps to a shared handle of that branch;
//! the branch itself keeps only a weak back-reference to the index, so a
//! closed registry never leaks and a removed branch cannot re-index itself.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use crate::observability::{Logger, Severity};
use crate::revision::{Revision, RevisionVector};

use super::branch::Branch;
use super::errors::{BranchError, BranchResult};

/// Revision-keyed lookup index shared between the registry and every live
/// branch handle.
pub(crate) struct BranchIndex {
    map: RwLock<HashMap<Revision, Arc<Branch>>>,
}

impl BranchIndex {
    fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> BranchResult<std::sync::RwLockReadGuard<'_, HashMap<Revision, Arc<Branch>>>> {
        self.map
            .read()
            .map_err(|_| BranchError::Internal("Lock poisoned".into()))
    }

    fn write(
        &self,
    ) -> BranchResult<std::sync::RwLockWriteGuard<'_, HashMap<Revision, Arc<Branch>>>> {
        self.map
            .write()
            .map_err(|_| BranchError::Internal("Lock poisoned".into()))
    }

    /// Claims `revision` for `branch`. Re-claiming a revision the same
    /// branch already owns is a no-op; a revision owned by another live
    /// branch is a collision.
    pub(crate) fn claim(&self, revision: Revision, branch: &Arc<Branch>) -> BranchResult<()> {
        match self.write()?.entry(revision) {
            Entry::Occupied(entry) => {
                if Arc::ptr_eq(entry.get(), branch) {
                    Ok(())
                } else {
                    Err(BranchError::AlreadyStaged(revision))
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(branch));
                Ok(())
            }
        }
    }

    fn release(&self, revisions: &[Revision], branch: &Arc<Branch>) -> BranchResult<usize> {
        let mut map = self.write()?;
        let mut released = 0;
        for revision in revisions {
            if map.get(revision).is_some_and(|b| Arc::ptr_eq(b, branch)) {
                map.remove(revision);
                released += 1;
            }
        }
        Ok(released)
    }
}

/// Registry of all branches not yet merged into the shared trunk history.
///
/// Lifecycle is tied to the store session: initialized at store open, torn
/// down at store close. A fresh instance knows no branches, which is what
/// makes crash recovery a pure check-and-discard pass.
pub struct UnmergedBranches {
    index: Arc<BranchIndex>,
}

impl UnmergedBranches {
    pub fn new() -> Self {
        Self {
            index: Arc::new(BranchIndex::new()),
        }
    }

    /// Creates and registers a new branch seeded with one empty commit at
    /// `first_revision`.
    ///
    /// Fails if `first_revision` is not branch-flagged or already belongs to
    /// a live branch.
    pub fn create(
        &self,
        base: RevisionVector,
        first_revision: Revision,
        parent: Option<&Arc<Branch>>,
    ) -> BranchResult<Arc<Branch>> {
        if !first_revision.is_branch() {
            return Err(BranchError::NotBranchRevision(first_revision));
        }
        let branch = Branch::new_cyclic(base, first_revision, parent, Arc::downgrade(&self.index));
        self.index.claim(first_revision, &branch)?;
        Ok(branch)
    }

    /// The live branch owning `revision`, if any.
    ///
    /// Absence is a checked outcome, not an error: it is how callers decide
    /// "this revision is not staged (anymore)".
    pub fn get_branch(&self, revision: Revision) -> Option<Arc<Branch>> {
        self.index
            .read()
            .ok()?
            .get(&revision)
            .filter(|branch| !branch.is_removed())
            .cloned()
    }

    /// Removes a branch from the registry, after a merge has durably
    /// published its commits or on explicit abandonment.
    ///
    /// Returns the number of revisions unindexed. Removal is exactly-once:
    /// a second call is a no-op returning 0, and the branch's revisions are
    /// never again resolvable via `get_branch`.
    pub fn remove_branch(&self, branch: &Arc<Branch>) -> BranchResult<usize> {
        let revisions = branch.detach()?;
        if revisions.is_empty() {
            return Ok(0);
        }
        let released = self.index.release(&revisions, branch)?;
        Logger::log(
            Severity::Trace,
            "branch.removed",
            &[("revisions", &released.to_string())],
        );
        Ok(released)
    }

    /// Number of distinct live branches.
    pub fn branch_count(&self) -> usize {
        self.index
            .read()
            .map(|map| {
                let mut seen: Vec<*const Branch> = map.values().map(Arc::as_ptr).collect();
                seen.sort_unstable();
                seen.dedup();
                seen.len()
            })
            .unwrap_or(0)
    }

    /// Number of revisions currently claimed by live branches.
    pub fn revision_count(&self) -> usize {
        self.index.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.revision_count() == 0
    }
}

impl Default for UnmergedBranches {
    fn default() -> Self {
        Self::new()
    }
}
