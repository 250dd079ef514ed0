//! Revision - cluster-wide point-of-change identity
//!
//! A revision names exactly one change made by one cluster node:
//! - Revisions from the same node are totally ordered by `(timestamp, counter)`
//! - Revisions from different nodes order by timestamp, cluster id as tie-break
//! - The cross-node order is a tie-break convention only; causal order is
//!   carried by `RevisionVector`, never by comparing raw revisions
//! - The branch flag marks a revision as staged, never part of trunk history
//!
//! This is a pure identity type. Minting lives in `RevisionGenerator`.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::RevisionParseError;

/// A unique, comparable identifier for one point of change.
///
/// Immutable after construction. Two revisions are equal only if all four
/// fields match; the branch flag participates in equality but is the least
/// significant tie-break in the ordering, so a branch revision and its trunk
/// counterpart sort adjacently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revision {
    timestamp_ms: i64,
    counter: u32,
    cluster_id: u32,
    branch: bool,
}

impl Revision {
    /// Creates a trunk (non-branch) revision with the given fields.
    pub fn new(timestamp_ms: i64, counter: u32, cluster_id: u32) -> Self {
        Self {
            timestamp_ms,
            counter,
            cluster_id,
            branch: false,
        }
    }

    /// Milliseconds since the epoch at which this revision was minted.
    #[inline]
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Uniqueness counter within `(timestamp_ms, cluster_id)`.
    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// The cluster node that minted this revision.
    #[inline]
    pub fn cluster_id(&self) -> u32 {
        self.cluster_id
    }

    /// True if this revision belongs to an uncommitted branch.
    #[inline]
    pub fn is_branch(&self) -> bool {
        self.branch
    }

    /// Returns a branch-flagged copy of this revision.
    #[inline]
    pub fn as_branch(&self) -> Self {
        Self {
            branch: true,
            ..*self
        }
    }

    /// Returns a trunk-flagged copy of this revision.
    #[inline]
    pub fn as_trunk(&self) -> Self {
        Self {
            branch: false,
            ..*self
        }
    }
}

impl Ord for Revision {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp_ms
            .cmp(&other.timestamp_ms)
            .then_with(|| self.counter.cmp(&other.counter))
            .then_with(|| self.cluster_id.cmp(&other.cluster_id))
            .then_with(|| self.branch.cmp(&other.branch))
    }
}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Revision {
    /// Formats as `r<timestamp-hex>-<counter-hex>-<cluster-hex>`, with a
    /// leading `b` for branch revisions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.branch {
            f.write_str("b")?;
        }
        write!(
            f,
            "r{:x}-{:x}-{:x}",
            self.timestamp_ms, self.counter, self.cluster_id
        )
    }
}

impl FromStr for Revision {
    type Err = RevisionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RevisionParseError::Malformed(s.to_string());

        let (branch, rest) = match s.strip_prefix('b') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let rest = rest.strip_prefix('r').ok_or_else(malformed)?;

        let mut parts = rest.splitn(3, '-');
        let ts = parts.next().ok_or_else(malformed)?;
        let counter = parts.next().ok_or_else(malformed)?;
        let cluster = parts.next().ok_or_else(malformed)?;

        let field = |field| RevisionParseError::InvalidField {
            field,
            literal: s.to_string(),
        };
        let timestamp_ms =
            i64::from_str_radix(ts, 16).map_err(|_| field("timestamp"))?;
        let counter = u32::from_str_radix(counter, 16).map_err(|_| field("counter"))?;
        let cluster_id = u32::from_str_radix(cluster, 16).map_err(|_| field("cluster id"))?;

        Ok(Self {
            timestamp_ms,
            counter,
            cluster_id,
            branch,
        })
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(D::Error::custom)
    }
}
