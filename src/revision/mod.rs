//! Revision subsystem
//!
//! The identity layer of the store: every change anywhere in the cluster is
//! named by a `Revision`, and causal order across cluster nodes is carried
//! by `RevisionVector` snapshots.
//!
//! This module provides:
//! - `Revision` - unique, comparable point-of-change identity
//! - `RevisionGenerator` - per-node lock-free minting authority
//! - `RevisionVector` - immutable latest-revision-per-node snapshot
//!
//! # Invariants Enforced
//!
//! - Revisions are immutable; "mutation" is minting a fresh one
//! - One generator per cluster node never issues duplicates, even under
//!   concurrent callers
//! - Cross-node ordering is only a tie-break; causality lives in vectors

mod errors;
mod generator;
mod revision;
mod vector;

pub use errors::RevisionParseError;
pub use generator::RevisionGenerator;
pub use revision::Revision;
pub use vector::RevisionVector;
