//! DocumentStore - the persisted-store collaborator boundary
//!
//! The revision/branch core never performs I/O of its own; merge writes
//! through this trait and recovery reads through it. Implementations carry
//! their own durability and failure semantics; the core never retries.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::revision::Revision;

use super::document::Document;
use super::errors::StoreResult;

/// The document collections this core touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Content-tree node documents.
    Nodes,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Nodes => "nodes",
        }
    }
}

/// Boundary to the persistent key/value document storage engine.
///
/// All calls are synchronous; blocking behavior and retry policy belong to
/// the implementation, never to the callers in this core.
pub trait DocumentStore: Send + Sync {
    /// Looks up a single document.
    fn find(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Lists the ids of every document in a collection. Recovery scans
    /// through this; backends may serve it from an index.
    fn document_ids(&self, collection: Collection) -> StoreResult<Vec<String>>;

    /// Records a property change at a revision, creating the document if it
    /// does not exist. `None` records a removal.
    fn set_property(
        &self,
        collection: Collection,
        id: &str,
        property: &str,
        revision: Revision,
        value: Option<Value>,
    ) -> StoreResult<()>;

    /// Marks a trunk revision durably committed on a document.
    fn mark_committed(
        &self,
        collection: Collection,
        id: &str,
        revision: Revision,
    ) -> StoreResult<()>;

    /// Removes every local-map entry on a document recorded under one of
    /// `revisions`. Returns the number of entries removed.
    fn strip(
        &self,
        collection: Collection,
        id: &str,
        revisions: &BTreeSet<Revision>,
    ) -> StoreResult<usize>;
}
