use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// message of the root commit written by `init`
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// an immutable snapshot of tracked files plus history links
///
/// field order is part of the on-disk encoding and therefore of the commit
/// hash. `tracked` is a BTreeMap so serialization is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// commit message
    pub message: String,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
    /// parent commit hashes (empty for the root, 1 normally, 2 for a merge)
    pub parents: Vec<Hash>,
    /// path -> blob hash
    pub tracked: BTreeMap<String, Hash>,
}

impl Commit {
    /// create a new commit stamped with the current time
    pub fn new(
        parents: Vec<Hash>,
        tracked: BTreeMap<String, Hash>,
        message: impl Into<String>,
    ) -> Self {
        Self::with_timestamp(parents, tracked, Utc::now().timestamp(), message)
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        parents: Vec<Hash>,
        tracked: BTreeMap<String, Hash>,
        timestamp: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            timestamp,
            parents,
            tracked,
        }
    }

    /// the root commit every repository starts from
    pub fn initial() -> Self {
        Self::with_timestamp(vec![], BTreeMap::new(), 0, INITIAL_COMMIT_MESSAGE)
    }

    /// is this an initial commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// is this a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn first_parent(&self) -> Option<&Hash> {
        self.parents.first()
    }

    /// blob tracked at `path`, if any
    pub fn blob(&self, path: &str) -> Option<&Hash> {
        self.tracked.get(path)
    }

    pub fn tracks(&self, path: &str) -> bool {
        self.tracked.contains_key(path)
    }

    /// commit time as a UTC datetime
    pub fn date(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp, 0).unwrap_or_default()
    }
}
