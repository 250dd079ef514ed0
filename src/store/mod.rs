//! Document-store boundary
//!
//! The revision/branch core treats the persistent key/value document engine
//! as an external collaborator; this module pins down that boundary.
//!
//! This module provides:
//! - `Document` - per-property local revision maps + committed set
//! - `DocumentStore` - the collaborator trait (find/scan/write/strip)
//! - `MemoryDocumentStore` - in-process reference implementation
//! - `path_to_id` - content-path to document-id mapping

mod backend;
mod document;
mod errors;
mod memory;

pub use backend::{Collection, DocumentStore};
pub use document::{path_to_id, Document};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryDocumentStore;
