//! RevisionGenerator - per-node revision minting
//!
//! One generator exists per cluster node. It is the sole authority for new
//! revisions on that node:
//! - Concurrent callers on the same node never receive the same revision
//! - The minted sequence is strictly increasing even when the wall clock
//!   stalls or steps backwards
//! - Different cluster nodes mint independently and never coordinate
//!
//! State is a single `AtomicU64` packing `(timestamp_ms, counter)`; a mint is
//! one compare-and-swap, no locking.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use super::Revision;

/// Low bits of the packed state reserved for the per-millisecond counter.
const COUNTER_BITS: u32 = 16;
const COUNTER_MASK: u64 = (1 << COUNTER_BITS) - 1;

/// Mints unique, monotonically increasing revisions for one cluster node.
#[derive(Debug)]
pub struct RevisionGenerator {
    cluster_id: u32,
    /// `(timestamp_ms << COUNTER_BITS) | counter` of the last minted revision.
    state: AtomicU64,
}

impl RevisionGenerator {
    /// Creates a generator for the given cluster node.
    pub fn new(cluster_id: u32) -> Self {
        Self {
            cluster_id,
            state: AtomicU64::new(0),
        }
    }

    /// The cluster node this generator mints for.
    #[inline]
    pub fn cluster_id(&self) -> u32 {
        self.cluster_id
    }

    /// Mints a fresh trunk revision, strictly greater than every revision
    /// previously minted or observed by this generator.
    ///
    /// If the wall clock has not advanced since the last mint, the counter is
    /// incremented; if the counter is exhausted within one millisecond, the
    /// timestamp runs ahead of the clock by one millisecond.
    pub fn next(&self) -> Revision {
        loop {
            let prev = self.state.load(Ordering::Acquire);
            let now = Utc::now().timestamp_millis().max(0) as u64;

            let prev_ts = prev >> COUNTER_BITS;
            let prev_counter = prev & COUNTER_MASK;

            let (ts, counter) = if now > prev_ts {
                (now, 0)
            } else if prev_counter < COUNTER_MASK {
                (prev_ts, prev_counter + 1)
            } else {
                (prev_ts + 1, 0)
            };

            let next = (ts << COUNTER_BITS) | counter;
            if self
                .state
                .compare_exchange(prev, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Revision::new(ts as i64, counter as u32, self.cluster_id);
            }
        }
    }

    /// Mints a fresh branch-flagged revision.
    pub fn next_branch(&self) -> Revision {
        self.next().as_branch()
    }

    /// Fast-forwards the generator past a revision seen elsewhere (for
    /// example one read back from the persisted store on startup), so that
    /// later mints sort after it. Revisions from other cluster nodes are
    /// ignored; nodes never coordinate through the generator.
    pub fn observe(&self, revision: &Revision) {
        if revision.cluster_id() != self.cluster_id {
            return;
        }
        let seen = ((revision.timestamp_ms().max(0) as u64) << COUNTER_BITS)
            | (u64::from(revision.counter()) & COUNTER_MASK);
        self.state.fetch_max(seen, Ordering::AcqRel);
    }
}
