//! Recovery error types
//!
//! Recovery itself has no failure mode of its own; it fails only when the
//! persisted store cannot be read or written. Orphaned work is never an
//! error: it is reported as a count and surfaced to readers only as the
//! absence of the orphaned content.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// Errors raised by the startup reconciliation pass
#[derive(Debug, Clone, Error)]
pub enum RecoveryError {
    /// The persisted store failed mid-scan.
    #[error("Store access failed during recovery: {0}")]
    Store(#[from] StoreError),
}
