//! object access capability shared by local and remote repositories

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::hash::Hash;
use crate::object::{read_blob, read_commit, write_blob, write_commit, ObjectKind, ObjectStore};
use crate::repo::{CONFIG_FILE, META_DIR};
use crate::types::Commit;

/// where objects are read from and written to
///
/// every variant honors the same contract; callers never need to know which
/// one they hold.
#[derive(Clone, Debug)]
pub enum ObjectSource {
    /// the object store of the repository being operated on
    Local(ObjectStore),
    /// the object store of another repository on this filesystem
    Remote { location: PathBuf, store: ObjectStore },
}

impl ObjectSource {
    /// open the objects of the repository whose working tree is `location`
    pub fn remote(location: impl Into<PathBuf>) -> Result<Self> {
        let location = location.into();
        let meta = location.join(META_DIR);
        let config_path = meta.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(Error::NoRepo(location));
        }
        let config = Config::load(&config_path)?;
        let store = ObjectStore::new(
            meta.join("objects"),
            meta.join("tmp"),
            config.compression_level,
        );
        Ok(Self::Remote { location, store })
    }

    pub fn store(&self) -> &ObjectStore {
        match self {
            ObjectSource::Local(store) => store,
            ObjectSource::Remote { store, .. } => store,
        }
    }

    /// working tree of the remote repository, None for local
    pub fn location(&self) -> Option<&Path> {
        match self {
            ObjectSource::Local(_) => None,
            ObjectSource::Remote { location, .. } => Some(location),
        }
    }

    pub fn get(&self, kind: ObjectKind, hash: &Hash) -> Result<Vec<u8>> {
        self.store().get(kind, hash)
    }

    pub fn put(&self, kind: ObjectKind, bytes: &[u8]) -> Result<Hash> {
        self.store().put(kind, bytes)
    }

    pub fn read_blob(&self, hash: &Hash) -> Result<Vec<u8>> {
        read_blob(self.store(), hash)
    }

    pub fn write_blob(&self, content: &[u8]) -> Result<Hash> {
        write_blob(self.store(), content)
    }

    pub fn read_commit(&self, hash: &Hash) -> Result<Commit> {
        read_commit(self.store(), hash)
    }

    pub fn write_commit(&self, commit: &Commit) -> Result<Hash> {
        write_commit(self.store(), commit)
    }

    /// every commit hash in the store
    pub fn list_commits(&self) -> Result<Vec<Hash>> {
        self.store().list(ObjectKind::Commit)
    }

    /// resolve a full or abbreviated commit id
    pub fn resolve_commit(&self, prefix: &str) -> Result<Hash> {
        self.store()
            .resolve_prefix(ObjectKind::Commit, prefix)?
            .ok_or_else(|| Error::NoSuchCommit(prefix.to_string()))
    }

    /// graph of every commit reachable from `tips`
    pub fn commit_graph(&self, tips: &[Hash]) -> Result<CommitGraph> {
        CommitGraph::load_reachable(tips, |hash| Ok(self.read_commit(hash)?.parents))
    }

    /// graph of every commit in the store, reachable or not
    pub fn full_commit_graph(&self) -> Result<CommitGraph> {
        let mut commits = Vec::new();
        for hash in self.list_commits()? {
            commits.push((hash, self.read_commit(&hash)?.parents));
        }
        Ok(CommitGraph::build(commits))
    }

    /// true iff `a` is `b` or one of its ancestors
    pub fn is_ancestor(&self, a: &Hash, b: &Hash) -> Result<bool> {
        Ok(self.commit_graph(&[*b])?.is_ancestor(a, b))
    }

    /// merge base of two commits, see [`CommitGraph::find_split_point`]
    pub fn find_split_point(&self, c1: &Hash, c2: &Hash) -> Result<Hash> {
        let graph = self.commit_graph(&[*c1, *c2])?;
        let split = graph
            .find_split_point(c1, c2)
            .ok_or(Error::NoCommonAncestor(*c1, *c2))?;
        tracing::debug!(%c1, %c2, %split, "resolved split point");
        Ok(split)
    }
}
