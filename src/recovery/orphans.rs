//! Orphan reconciliation
//!
//! A process that terminates before merging leaves its staged branch
//! commits behind in document local maps. Those entries were never written
//! to the trunk-visible part of any document, so after a restart they are
//! unreachable garbage: a fresh `UnmergedBranches` knows no branch that
//! could ever claim them.
//!
//! The policy is discard, don't replay. The pass runs once at store open,
//! before any new branch is created, and strips every branch-scoped entry
//! whose revision has no live owner. Readers would not have seen the data
//! either way; the strip keeps the store from accumulating dead entries.

use std::collections::BTreeSet;

use crate::branch::UnmergedBranches;
use crate::observability::{Logger, Severity};
use crate::revision::Revision;
use crate::store::{Collection, DocumentStore};

use super::errors::RecoveryResult;

/// Scans the persisted store for branch commits with no live owner and
/// strips them. Returns the number of distinct orphaned branch revisions
/// discarded.
///
/// Must run against a freshly opened store session: `branches` is expected
/// to be the session's registry, before any writer has created a branch, so
/// every persisted branch revision found is either owned by a live branch
/// (nothing to do) or abandoned by a dead process instance.
pub fn reconcile_on_open(
    store: &dyn DocumentStore,
    branches: &UnmergedBranches,
) -> RecoveryResult<usize> {
    let mut orphaned: BTreeSet<Revision> = BTreeSet::new();
    let mut documents_touched = 0usize;

    for id in store.document_ids(Collection::Nodes)? {
        let Some(document) = store.find(Collection::Nodes, &id)? else {
            continue;
        };

        let dead: BTreeSet<Revision> = document
            .branch_revisions()
            .into_iter()
            .filter(|revision| branches.get_branch(*revision).is_none())
            .collect();
        if dead.is_empty() {
            continue;
        }

        store.strip(Collection::Nodes, &id, &dead)?;
        documents_touched += 1;
        orphaned.extend(dead);
    }

    Logger::log(
        Severity::Info,
        "recovery.orphans_reconciled",
        &[
            ("documents", &documents_touched.to_string()),
            ("revisions", &orphaned.len().to_string()),
        ],
    );
    Ok(orphaned.len())
}
