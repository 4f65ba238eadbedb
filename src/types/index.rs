use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::types::Commit;

/// pending changes between HEAD and the next commit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingArea {
    /// path -> blob hash to add or overwrite
    #[serde(default)]
    pub addition: BTreeMap<String, Hash>,
    /// paths to drop from the next commit
    #[serde(default)]
    pub removal: BTreeSet<String>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.addition.is_empty() && self.removal.is_empty()
    }

    /// stage `path` at `hash`, clearing any removal mark
    pub fn stage_addition(&mut self, path: impl Into<String>, hash: Hash) {
        let path = path.into();
        self.removal.remove(&path);
        self.addition.insert(path, hash);
    }

    /// mark `path` for removal, dropping any pending addition
    pub fn stage_removal(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.addition.remove(&path);
        self.removal.insert(path);
    }

    /// forget everything staged for `path`; returns true if anything was staged
    pub fn unstage(&mut self, path: &str) -> bool {
        let added = self.addition.remove(path).is_some();
        let removed = self.removal.remove(path);
        added || removed
    }

    pub fn is_staged_for_addition(&self, path: &str) -> bool {
        self.addition.contains_key(path)
    }

    pub fn is_staged_for_removal(&self, path: &str) -> bool {
        self.removal.contains(path)
    }

    pub fn clear(&mut self) {
        self.addition.clear();
        self.removal.clear();
    }

    /// apply staged changes on top of a tracked mapping
    pub fn apply(&self, tracked: &BTreeMap<String, Hash>) -> BTreeMap<String, Hash> {
        let mut result = tracked.clone();
        for (path, hash) in &self.addition {
            result.insert(path.clone(), *hash);
        }
        for path in &self.removal {
            result.remove(path);
        }
        result
    }

    /// build the commit that would record these changes on top of `parent`
    pub fn build_commit(
        &self,
        parent_hash: Hash,
        parent: &Commit,
        message: &str,
        timestamp: i64,
    ) -> Result<Commit> {
        if self.is_empty() {
            return Err(Error::NothingToCommit);
        }

        Ok(Commit::with_timestamp(
            vec![parent_hash],
            self.apply(&parent.tracked),
            timestamp,
            message,
        ))
    }
}
