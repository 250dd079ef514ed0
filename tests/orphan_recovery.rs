//! Orphan Recovery Tests
//!
//! End-to-end crash/restart scenarios against the in-memory store:
//! - Staged work from a dead process instance is discarded, never replayed
//! - Trunk-visible committed data survives recovery untouched
//! - A merged branch leaves nothing for recovery to find

use std::collections::BTreeSet;

use serde_json::json;

use revdb::branch::UnmergedBranches;
use revdb::recovery::reconcile_on_open;
use revdb::revision::{Revision, RevisionGenerator, RevisionVector};
use revdb::store::{path_to_id, Collection, DocumentStore, MemoryDocumentStore};

// =============================================================================
// Test Utilities
// =============================================================================

/// Publishes a trunk-visible property on a document: write plus commit
/// marker, the way the merge orchestrator does.
fn publish(store: &MemoryDocumentStore, id: &str, property: &str, revision: Revision, value: serde_json::Value) {
    store
        .set_property(Collection::Nodes, id, property, revision, Some(value))
        .unwrap();
    store
        .mark_committed(Collection::Nodes, id, revision)
        .unwrap();
}

// =============================================================================
// Discard, Don't Replay
// =============================================================================

/// A node stages a branch commit that sets a local property, then the
/// process terminates before merge. A new process instance starting against
/// the same persisted store must report the property as absent on the root.
#[test]
fn test_orphaned_property_is_absent_after_restart() {
    let store = MemoryDocumentStore::new();
    let root_id = path_to_id("/");

    // --- first process instance ---
    {
        let branches = UnmergedBranches::new();
        let gen = RevisionGenerator::new(1);

        let c1 = gen.next_branch();
        let branch = branches
            .create(RevisionVector::from(gen.next()), c1, None)
            .unwrap();
        branch.track(c1, "/").unwrap();
        store
            .set_property(Collection::Nodes, &root_id, "p", c1, Some(json!("v")))
            .unwrap();

        // Process dies here: no merge, branches dropped with the session.
    }

    // --- second process instance ---
    let branches = UnmergedBranches::new();
    let discarded = reconcile_on_open(&store, &branches).unwrap();
    assert_eq!(discarded, 1);

    let root = store.find(Collection::Nodes, &root_id).unwrap().unwrap();
    assert_eq!(root.visible_value("p"), None);
    assert!(root.branch_revisions().is_empty());
    // Nothing was resurrected as a live branch.
    assert!(branches.is_empty());
}

/// Recovery discards staged work without touching committed trunk data on
/// the same documents.
#[test]
fn test_committed_data_survives_recovery() {
    let store = MemoryDocumentStore::new();
    let root_id = path_to_id("/");
    let gen = RevisionGenerator::new(1);

    publish(&store, &root_id, "kept", gen.next(), json!("trunk"));

    // Abandoned staged change on the same document and property name.
    let abandoned = gen.next_branch();
    store
        .set_property(Collection::Nodes, &root_id, "kept", abandoned, Some(json!("staged")))
        .unwrap();

    let branches = UnmergedBranches::new();
    assert_eq!(reconcile_on_open(&store, &branches).unwrap(), 1);

    let root = store.find(Collection::Nodes, &root_id).unwrap().unwrap();
    assert_eq!(root.visible_value("kept"), Some(&json!("trunk")));
}

/// Several documents touched by one abandoned branch are all cleaned, and
/// the branch's distinct revisions are counted once each.
#[test]
fn test_multi_document_orphan_cleanup() {
    let store = MemoryDocumentStore::new();
    let gen = RevisionGenerator::new(1);

    let c1 = gen.next_branch();
    let c2 = gen.next_branch();
    for path in ["/", "/foo", "/foo/bar"] {
        store
            .set_property(Collection::Nodes, &path_to_id(path), "p", c1, Some(json!(1)))
            .unwrap();
        store
            .set_property(Collection::Nodes, &path_to_id(path), "q", c2, Some(json!(2)))
            .unwrap();
    }

    let branches = UnmergedBranches::new();
    assert_eq!(reconcile_on_open(&store, &branches).unwrap(), 2);

    for path in ["/", "/foo", "/foo/bar"] {
        let doc = store
            .find(Collection::Nodes, &path_to_id(path))
            .unwrap()
            .unwrap();
        assert!(doc.branch_revisions().is_empty());
    }
}

// =============================================================================
// Live and Merged Branches
// =============================================================================

/// Staged entries whose branch is still live in the current session are not
/// orphans and survive the pass.
#[test]
fn test_live_branch_is_not_an_orphan() {
    let store = MemoryDocumentStore::new();
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);
    let root_id = path_to_id("/");

    let c1 = gen.next_branch();
    let branch = branches
        .create(RevisionVector::from(gen.next()), c1, None)
        .unwrap();
    branch.track(c1, "/").unwrap();
    store
        .set_property(Collection::Nodes, &root_id, "p", c1, Some(json!("staged")))
        .unwrap();

    assert_eq!(reconcile_on_open(&store, &branches).unwrap(), 0);
    let root = store.find(Collection::Nodes, &root_id).unwrap().unwrap();
    assert_eq!(root.branch_revisions(), BTreeSet::from([c1]));
}

/// After a merge publishes a branch and removes it from the registry, a
/// restart finds nothing to discard.
#[test]
fn test_merged_branch_leaves_no_orphans() {
    let store = MemoryDocumentStore::new();
    let root_id = path_to_id("/");
    let gen = RevisionGenerator::new(1);

    // Writer session stages one change.
    let branches = UnmergedBranches::new();
    let c1 = gen.next_branch();
    let branch = branches
        .create(RevisionVector::from(gen.next()), c1, None)
        .unwrap();
    branch.track(c1, "/").unwrap();
    store
        .set_property(Collection::Nodes, &root_id, "p", c1, Some(json!("v")))
        .unwrap();

    // Merge orchestrator: publish under a fresh trunk revision, strip the
    // staged entries, then drop the branch from the registry.
    let merged_at = gen.next();
    publish(&store, &root_id, "p", merged_at, json!("v"));
    store
        .strip(Collection::Nodes, &root_id, &BTreeSet::from([c1]))
        .unwrap();
    branches.remove_branch(&branch).unwrap();

    // Restarted instance: nothing staged remains, trunk value is visible.
    let fresh = UnmergedBranches::new();
    assert_eq!(reconcile_on_open(&store, &fresh).unwrap(), 0);
    let root = store.find(Collection::Nodes, &root_id).unwrap().unwrap();
    assert_eq!(root.visible_value("p"), Some(&json!("v")));
}
