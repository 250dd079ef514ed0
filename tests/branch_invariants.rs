//! Branch Staging Invariant Tests
//!
//! Tests for core branch invariants:
//! - Accumulated modified paths follow chain order
//! - Foreign revisions fail loudly, never silently
//! - Rebase preserves pre-boundary results
//! - Registry removal makes revisions unresolvable

use std::collections::BTreeSet;

use revdb::branch::{BranchError, UnmergedBranches};
use revdb::revision::{RevisionGenerator, RevisionVector};

fn assert_paths(actual: &BTreeSet<String>, expected: &[&str]) {
    let expected: BTreeSet<String> = expected.iter().map(|p| p.to_string()).collect();
    assert_eq!(*actual, expected);
}

// =============================================================================
// Accumulated Modified Paths
// =============================================================================

/// The full staging lifecycle: track, append, rebase, append, query.
#[test]
fn test_modified_paths_until_across_rebase() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let base = RevisionVector::from(gen.next());
    let c1 = gen.next_branch();
    let branch = branches.create(base, c1, None).unwrap();
    branch.track(c1, "/foo").unwrap();

    let c2 = gen.next_branch();
    branch.add_commit(c2).unwrap();
    branch.track(c2, "/bar").unwrap();

    let c3 = gen.next_branch();
    branch
        .rebase(c3, RevisionVector::from(gen.next()))
        .unwrap();

    let c4 = gen.next_branch();
    branch.add_commit(c4).unwrap();
    branch.track(c4, "/baz").unwrap();

    // A trunk revision is foreign by definition.
    assert!(matches!(
        branch.modified_paths_until(gen.next()),
        Err(BranchError::ForeignRevision(_))
    ));

    assert_paths(&branch.modified_paths_until(c1).unwrap(), &["/foo"]);
    assert_paths(&branch.modified_paths_until(c2).unwrap(), &["/foo", "/bar"]);
    assert_paths(&branch.modified_paths_until(c3).unwrap(), &["/foo", "/bar"]);
    assert_paths(
        &branch.modified_paths_until(c4).unwrap(),
        &["/foo", "/bar", "/baz"],
    );

    // A branch revision never added to this chain fails too.
    let c5 = gen.next_branch();
    assert!(matches!(
        branch.modified_paths_until(c5),
        Err(BranchError::ForeignRevision(_))
    ));
}

/// Union over the chain equals the union of per-commit tracked paths, for
/// every prefix.
#[test]
fn test_prefix_unions() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let c1 = gen.next_branch();
    let branch = branches
        .create(RevisionVector::from(gen.next()), c1, None)
        .unwrap();

    let mut revisions = vec![c1];
    branch.track(c1, "/p0").unwrap();
    for i in 1..5 {
        let c = gen.next_branch();
        branch.add_commit(c).unwrap();
        branch.track(c, &format!("/p{}", i)).unwrap();
        revisions.push(c);
    }

    for (k, revision) in revisions.iter().enumerate() {
        let expected: Vec<String> = (0..=k).map(|i| format!("/p{}", i)).collect();
        let expected_refs: Vec<&str> = expected.iter().map(String::as_str).collect();
        assert_paths(&branch.modified_paths_until(*revision).unwrap(), &expected_refs);
    }
}

/// Tracking the same path twice does not duplicate it.
#[test]
fn test_tracking_is_idempotent() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let c1 = gen.next_branch();
    let branch = branches
        .create(RevisionVector::from(gen.next()), c1, None)
        .unwrap();
    branch.track(c1, "/foo").unwrap();
    branch.track(c1, "/foo").unwrap();

    let paths = branch.modified_paths_until(c1).unwrap();
    assert_eq!(paths.len(), 1);
}

// =============================================================================
// Rebase Boundaries
// =============================================================================

/// Rebase preserves every pre-boundary query result and replaces the base
/// only for the commits after the boundary.
#[test]
fn test_rebase_preserves_history() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let original_base = RevisionVector::from(gen.next());
    let c1 = gen.next_branch();
    let branch = branches.create(original_base.clone(), c1, None).unwrap();
    branch.track(c1, "/foo").unwrap();
    let before = branch.modified_paths_until(c1).unwrap();

    let new_base = original_base.update(gen.next());
    let boundary = gen.next_branch();
    branch.rebase(boundary, new_base.clone()).unwrap();

    assert_eq!(branch.modified_paths_until(c1).unwrap(), before);
    assert_eq!(branch.base(), new_base);
    assert_eq!(branch.base_at(c1).unwrap(), original_base);
    assert!(new_base.dominates(&original_base));
}

/// A rebase boundary is a real, queryable chain entry, but it is read-only:
/// it tracks no paths and rejects tracking.
#[test]
fn test_rebase_boundary_is_queryable_and_read_only() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let c1 = gen.next_branch();
    let branch = branches
        .create(RevisionVector::from(gen.next()), c1, None)
        .unwrap();
    branch.track(c1, "/foo").unwrap();

    let boundary = gen.next_branch();
    branch
        .rebase(boundary, RevisionVector::from(gen.next()))
        .unwrap();

    let commit = branch.get_commit(boundary).unwrap();
    assert!(commit.is_rebase());
    assert!(commit.tracked_paths().is_empty());

    assert!(matches!(
        branch.track(boundary, "/bar"),
        Err(BranchError::RebaseCommit(_))
    ));
    // The accumulated set at the boundary equals the preceding commit's.
    assert_eq!(
        branch.modified_paths_until(boundary).unwrap(),
        branch.modified_paths_until(c1).unwrap()
    );
}

// =============================================================================
// Registry Lifecycle
// =============================================================================

/// Every chain revision resolves to its owning branch until removal; after
/// removal, none do.
#[test]
fn test_remove_branch_ends_resolution() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let c1 = gen.next_branch();
    let branch = branches
        .create(RevisionVector::from(gen.next()), c1, None)
        .unwrap();
    let c2 = gen.next_branch();
    branch.add_commit(c2).unwrap();

    assert!(branches.get_branch(c1).is_some());
    assert!(branches.get_branch(c2).is_some());

    branches.remove_branch(&branch).unwrap();

    assert!(branches.get_branch(c1).is_none());
    assert!(branches.get_branch(c2).is_none());
    assert!(branches.is_empty());
}

/// A chain revision of one branch cannot be claimed by another.
#[test]
fn test_revisions_are_exclusively_owned() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let c1 = gen.next_branch();
    branches
        .create(RevisionVector::from(gen.next()), c1, None)
        .unwrap();

    assert!(matches!(
        branches.create(RevisionVector::from(gen.next()), c1, None),
        Err(BranchError::AlreadyStaged(_))
    ));
}

/// A failed append leaves the chain exactly as it was.
#[test]
fn test_failed_append_has_no_partial_effect() {
    let branches = UnmergedBranches::new();
    let gen = RevisionGenerator::new(1);

    let c1 = gen.next_branch();
    let c2 = gen.next_branch();
    let branch = branches
        .create(RevisionVector::from(gen.next()), c2, None)
        .unwrap();

    assert!(branch.add_commit(c1).is_err());
    assert_eq!(branch.commit_revisions(), vec![c2]);
    assert!(branches.get_branch(c1).is_none());
}
