use std::fs::{self, File};
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::fs::atomic_write;
use crate::hash::Hash;
use crate::index::write_index;
use crate::object::ObjectStore;
use crate::refs::{read_head, read_ref, write_head, write_ref, Head};
use crate::source::ObjectSource;
use crate::types::{Commit, StagingArea};
use crate::worktree::Worktree;

/// name of the metadata directory inside the working tree
pub const META_DIR: &str = ".sprig";

/// config file name inside the metadata directory
pub const CONFIG_FILE: &str = "config.toml";

/// a sprig repository: a working tree plus its `.sprig` metadata
///
/// HEAD, branches and the staging area are loaded from disk by each
/// operation and persisted before it returns; nothing is cached between
/// operations.
pub struct Repo {
    work_tree: PathBuf,
    path: PathBuf,
    config: Config,
    objects: ObjectSource,
}

impl Repo {
    /// initialize a new repository in `work_tree` with default config
    pub fn init(work_tree: &Path) -> Result<Self> {
        Self::init_with_config(work_tree, Config::default())
    }

    /// initialize a new repository in `work_tree`
    ///
    /// writes the root commit and points the default branch at it.
    pub fn init_with_config(work_tree: &Path, config: Config) -> Result<Self> {
        let path = work_tree.join(META_DIR);
        if path.exists() {
            return Err(Error::RepoExists(work_tree.to_path_buf()));
        }

        // create directory structure
        fs::create_dir_all(path.join("objects/blobs")).with_path(&path)?;
        fs::create_dir_all(path.join("objects/commits")).with_path(&path)?;
        fs::create_dir_all(path.join("refs/heads")).with_path(&path)?;
        fs::create_dir_all(path.join("tmp")).with_path(&path)?;

        config.save(&path.join("tmp"), &path.join(CONFIG_FILE))?;

        let repo = Self::from_parts(work_tree, config);

        let root = repo.objects.write_commit(&Commit::initial())?;
        let branch = repo.config.default_branch.clone();
        write_ref(&repo, &branch, &root)?;
        write_head(&repo, &Head::Branch(branch.clone()))?;
        write_index(&repo, &StagingArea::new())?;

        tracing::info!(path = %work_tree.display(), %branch, %root, "initialized repository");
        Ok(repo)
    }

    /// open an existing repository
    pub fn open(work_tree: &Path) -> Result<Self> {
        let config_path = work_tree.join(META_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(Error::NoRepo(work_tree.to_path_buf()));
        }

        let config = Config::load(&config_path)?;
        Ok(Self::from_parts(work_tree, config))
    }

    fn from_parts(work_tree: &Path, config: Config) -> Self {
        let path = work_tree.join(META_DIR);
        let store = ObjectStore::new(
            path.join("objects"),
            path.join("tmp"),
            config.compression_level,
        );
        Self {
            work_tree: work_tree.to_path_buf(),
            path,
            config,
            objects: ObjectSource::Local(store),
        }
    }

    /// metadata directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// working tree root
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// object access for this repository
    pub fn objects(&self) -> &ObjectSource {
        &self.objects
    }

    /// working-directory access
    pub fn worktree(&self) -> Worktree {
        Worktree::new(&self.work_tree)
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE)
    }

    /// path to branch refs
    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs/heads")
    }

    /// path to HEAD
    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    /// path to the staging area file
    pub fn index_path(&self) -> PathBuf {
        self.path.join("index")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path.join(".lock")
    }

    /// replace `dest` atomically via the repository tmp directory
    pub fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> Result<()> {
        atomic_write(&self.tmp_path(), dest, bytes)
    }

    /// current HEAD
    pub fn head(&self) -> Result<Head> {
        read_head(self)
    }

    /// name of the checked-out branch, None when detached
    pub fn current_branch(&self) -> Result<Option<String>> {
        Ok(match self.head()? {
            Head::Branch(name) => Some(name),
            Head::Detached(_) => None,
        })
    }

    /// commit HEAD points at
    pub fn head_commit_hash(&self) -> Result<Hash> {
        match self.head()? {
            Head::Branch(name) => read_ref(self, &name),
            Head::Detached(hash) => Ok(hash),
        }
    }

    /// commit HEAD points at, loaded
    pub fn head_commit(&self) -> Result<(Hash, Commit)> {
        let hash = self.head_commit_hash()?;
        let commit = self.objects.read_commit(&hash)?;
        Ok((hash, commit))
    }

    /// move whatever HEAD designates to `hash`
    ///
    /// on a branch the branch ref moves; when detached HEAD itself moves.
    pub fn advance_head(&self, hash: &Hash) -> Result<()> {
        match self.head()? {
            Head::Branch(name) => write_ref(self, &name, hash),
            Head::Detached(_) => write_head(self, &Head::Detached(*hash)),
        }
    }

    /// acquire exclusive lock on repository
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::LockContention)?;

        Ok(RepoLock { flock })
    }

    /// try to acquire exclusive lock, returning None if already locked
    pub fn try_lock(&self) -> Result<Option<RepoLock>> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => Ok(Some(RepoLock { flock })),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Ok(None),
            Err(_) => Err(Error::LockContention),
        }
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    #[allow(dead_code)]
    flock: Flock<File>,
}
// lock is released automatically when Flock is dropped
