//! # Branch Errors
//!
//! Error types for the branch staging module.
//!
//! Taxonomy:
//! - Invalid argument (`NotBranchRevision`, `OutOfOrder`, `ForeignRevision`,
//!   `RebaseCommit`, `AlreadyStaged`, `BranchRemoved`): a caller mistake,
//!   never retried
//! - Not found (`CommitNotFound`): an absent lookup target; distinguished
//!   because "absent" can be a checked outcome
//! - `Internal`: broken process-wide state (poisoned lock)

use thiserror::Error;

use crate::revision::Revision;

/// Result type for branch operations
pub type BranchResult<T> = Result<T, BranchError>;

/// Errors raised by branch staging and the unmerged-branch registry
#[derive(Debug, Clone, Error)]
pub enum BranchError {
    // ==================
    // Invalid Argument
    // ==================
    /// A branch operation was handed a trunk revision.
    #[error("Revision {0} is not branch-flagged")]
    NotBranchRevision(Revision),

    /// A new commit must sort after every commit already in the chain.
    #[error("Revision {revision} does not sort after chain end {chain_end}")]
    OutOfOrder {
        revision: Revision,
        chain_end: Revision,
    },

    /// The revision was never produced by this branch.
    #[error("Revision {0} does not belong to this branch")]
    ForeignRevision(Revision),

    /// Rebase boundaries are read-only markers; they track no paths.
    #[error("Revision {0} is a rebase boundary and cannot track paths")]
    RebaseCommit(Revision),

    /// No two live branches may claim the same revision.
    #[error("Revision {0} already belongs to a live branch")]
    AlreadyStaged(Revision),

    /// The branch was already merged or disposed.
    #[error("Branch has been removed from the unmerged registry")]
    BranchRemoved,

    // ==================
    // Not Found
    // ==================
    /// Exact commit lookup missed.
    #[error("No commit at revision {0} in this branch")]
    CommitNotFound(Revision),

    // ==================
    // Internal
    // ==================
    /// Process-wide state is broken (a lock was poisoned).
    #[error("Internal error: {0}")]
    Internal(String),
}
