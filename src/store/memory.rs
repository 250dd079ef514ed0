//! In-memory DocumentStore
//!
//! Reference implementation of the store boundary, shared by unit tests and
//! the crash/restart scenarios: the map outlives any one `UnmergedBranches`
//! instance, exactly like a persistent store outlives a process.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use serde_json::Value;

use crate::revision::Revision;

use super::backend::{Collection, DocumentStore};
use super::document::Document;
use super::errors::{StoreError, StoreResult};

type Docs = BTreeMap<(Collection, String), Document>;

/// A `DocumentStore` backed by an in-process map.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<Docs>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Docs>> {
        self.docs
            .read()
            .map_err(|_| StoreError::Internal("Lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Docs>> {
        self.docs
            .write()
            .map_err(|_| StoreError::Internal("Lock poisoned".into()))
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn find(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .read()?
            .get(&(collection, id.to_string()))
            .cloned())
    }

    fn document_ids(&self, collection: Collection) -> StoreResult<Vec<String>> {
        Ok(self
            .read()?
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, id)| id.clone())
            .collect())
    }

    fn set_property(
        &self,
        collection: Collection,
        id: &str,
        property: &str,
        revision: Revision,
        value: Option<Value>,
    ) -> StoreResult<()> {
        let mut docs = self.write()?;
        docs.entry((collection, id.to_string()))
            .or_insert_with(|| Document::new(id))
            .set_local(property, revision, value);
        Ok(())
    }

    fn mark_committed(
        &self,
        collection: Collection,
        id: &str,
        revision: Revision,
    ) -> StoreResult<()> {
        let mut docs = self.write()?;
        match docs.get_mut(&(collection, id.to_string())) {
            Some(doc) => {
                doc.mark_committed(revision);
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "No document {} in {}",
                id,
                collection.as_str()
            ))),
        }
    }

    fn strip(
        &self,
        collection: Collection,
        id: &str,
        revisions: &BTreeSet<Revision>,
    ) -> StoreResult<usize> {
        let mut docs = self.write()?;
        Ok(docs
            .get_mut(&(collection, id.to_string()))
            .map(|doc| doc.strip_revisions(revisions))
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_absent_document() {
        let store = MemoryDocumentStore::new();
        assert_eq!(store.find(Collection::Nodes, "0:/").unwrap(), None);
    }

    #[test]
    fn test_set_property_creates_document() {
        let store = MemoryDocumentStore::new();
        let rev = Revision::new(10, 0, 1);
        store
            .set_property(Collection::Nodes, "0:/", "p", rev, Some(json!("v")))
            .unwrap();

        let doc = store.find(Collection::Nodes, "0:/").unwrap().unwrap();
        assert_eq!(doc.id(), "0:/");
        assert!(doc.local_map("p").is_some());
        assert_eq!(store.document_ids(Collection::Nodes).unwrap(), vec!["0:/"]);
    }

    #[test]
    fn test_mark_committed_requires_document() {
        let store = MemoryDocumentStore::new();
        let rev = Revision::new(10, 0, 1);
        assert!(matches!(
            store.mark_committed(Collection::Nodes, "0:/", rev),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn test_strip_absent_document_is_zero() {
        let store = MemoryDocumentStore::new();
        let revisions = BTreeSet::from([Revision::new(10, 0, 1).as_branch()]);
        assert_eq!(
            store.strip(Collection::Nodes, "0:/", &revisions).unwrap(),
            0
        );
    }
}
