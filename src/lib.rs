//! sprig - single-node version control
//!
//! a small content-addressed version-control engine in the gitlet mould:
//! flat file snapshots, a commit DAG, a staging area, named branches and a
//! three-way merge that records conflicts in place.
//!
//! # Core concepts
//!
//! - **Blob**: file content, keyed by the SHA-1 of its bytes (stored zstd-compressed)
//! - **Commit**: message, timestamp, parents and a path -> blob map (CBOR)
//! - **Branch**: a named pointer to a commit under `.sprig/refs/heads`
//! - **HEAD**: the current branch, or a commit when detached
//! - **Staging area**: additions and removals for the next commit
//!
//! # Hash format
//!
//! blob hash = SHA1(content)
//!
//! commit hash = SHA1(CBOR(message, timestamp, parents, tracked))
//!
//! # Example usage
//!
//! ```no_run
//! use sprig::{ops, Repo};
//! use std::path::Path;
//!
//! // initialize a repository in a working tree
//! let repo = Repo::init(Path::new("/path/to/worktree")).unwrap();
//!
//! // stage a file and commit it
//! ops::stage_add(&repo, "notes.txt").unwrap();
//! let hash = ops::commit(&repo, "add notes").unwrap();
//!
//! // branch, and merge it back later
//! ops::create_branch(&repo, "topic").unwrap();
//! let outcome = ops::merge(&repo, "topic").unwrap();
//! ```

mod config;
mod error;
mod graph;
mod hash;
mod index;
mod object;
mod refs;
mod repo;
mod source;
mod worktree;

pub mod fs;
pub mod ops;
pub mod types;

pub use config::{Config, DEFAULT_BRANCH, DEFAULT_COMPRESSION_LEVEL};
pub use error::{Error, ErrorKind, Result};
pub use graph::{CommitGraph, Node};
pub use hash::{is_hex_prefix, Hash, HASH_LEN, HEX_LEN};
pub use index::{read_index, write_index};
pub use object::{
    blob_exists, compute_blob_hash, compute_commit_hash, read_blob, read_commit, write_blob,
    write_commit, ObjectKind, ObjectStore,
};
pub use refs::{
    delete_ref, list_refs, read_head, read_ref, ref_exists, validate_branch_name, write_head,
    write_ref, Head,
};
pub use repo::{Repo, RepoLock, CONFIG_FILE, META_DIR};
pub use source::ObjectSource;
pub use types::{Commit, StagingArea, INITIAL_COMMIT_MESSAGE};
pub use worktree::{validate_path, Worktree};
