//! Recovery subsystem
//!
//! Crash consistency for staged work, as an explicit startup pass rather
//! than logic scattered across store open:
//!
//! 1. Open the store session with a fresh, empty `UnmergedBranches`
//! 2. Run `reconcile_on_open` before any new branch is created
//! 3. Begin serving
//!
//! Partial, uncommitted work is invisible and inert after a restart: it is
//! not rolled forward and not rolled back, it is simply never promoted.

mod errors;
mod orphans;

pub use errors::{RecoveryError, RecoveryResult};
pub use orphans::reconcile_on_open;
