//! # Store Errors
//!
//! Error types for the document-store boundary. The in-memory store never
//! fails, but the trait is the seam to persistent backends, which do.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised at the document-store boundary
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store rejected or failed the operation.
    #[error("Store backend failure: {0}")]
    Backend(String),

    /// Process-wide state is broken (a lock was poisoned).
    #[error("Internal error: {0}")]
    Internal(String),
}
