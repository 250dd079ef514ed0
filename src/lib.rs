//! revdb - revision and branch tracking core for a clustered document store
//!
//! Every cluster node stages its work on a private branch built over a
//! shared, monotonically comparable trunk history. This crate implements
//! that core: revision identity and minting, vector-clock snapshots, branch
//! staging and rebase, the unmerged-branch registry, and the startup pass
//! that discards work orphaned by a crashed process instance.

pub mod branch;
pub mod observability;
pub mod recovery;
pub mod revision;
pub mod store;
