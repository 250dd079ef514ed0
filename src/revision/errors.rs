//! Revision error types
//!
//! Parsing is the only fallible surface in this module; minting and
//! comparison never fail.

use thiserror::Error;

/// Errors raised when parsing the string form of a revision or a
/// revision vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevisionParseError {
    /// Input did not start with the `r` marker (after an optional `b`).
    #[error("Invalid revision literal: {0:?}")]
    Malformed(String),

    /// One of the hex fields could not be parsed.
    #[error("Invalid {field} in revision literal {literal:?}")]
    InvalidField {
        field: &'static str,
        literal: String,
    },

    /// A revision vector literal carried two revisions for one cluster node.
    #[error("Duplicate cluster id {cluster_id} in revision vector literal")]
    DuplicateClusterId { cluster_id: u32 },
}
