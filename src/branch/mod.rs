//! Branch staging subsystem
//!
//! Gives every writer a private, uncommitted sequence of changes built on a
//! shared base snapshot, and tracks all such sequences process-wide until
//! they merge into trunk.
//!
//! This module provides:
//! - `BranchCommit` - one staged change and the paths it touched
//! - `Branch` - an ordered chain of staged commits over a base vector
//! - `UnmergedBranches` - session-scoped registry, indexed by revision
//!
//! # Invariants Enforced
//!
//! - Chain order is strict; every chain revision is branch-flagged
//! - No two live branches claim the same revision
//! - Rebase never alters pre-boundary query results
//! - Removal from the registry happens exactly once, at merge or disposal

mod branch;
mod commit;
mod errors;
mod unmerged;

pub use branch::Branch;
pub use commit::{BranchCommit, CommitKind};
pub use errors::{BranchError, BranchResult};
pub use unmerged::UnmergedBranches;
