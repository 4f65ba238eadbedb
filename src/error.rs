use std::path::PathBuf;

use crate::Hash;

/// error type for sprig operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not in an initialized sprig directory: {0}")]
    NoRepo(PathBuf),

    #[error("A sprig version-control system already exists in {0}")]
    RepoExists(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("No commit with that id exists.")]
    NoSuchCommit(String),

    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),

    #[error("File does not exist.")]
    FileNotFound(String),

    #[error("File does not exist in that commit.")]
    FileNotInCommit(String),

    #[error("No such branch exists.")]
    NoSuchBranch(String),

    #[error("A branch with that name already exists.")]
    BranchExists(String),

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No reason to remove the file.")]
    NoReasonToRemove(String),

    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch(String),

    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch(String),

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    CannotMergeSelf(String),

    #[error("HEAD is detached; check out a branch first.")]
    DetachedHead,

    #[error("no common ancestor between {0} and {1}")]
    NoCommonAncestor(Hash, Hash),

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileInTheWay(String),

    #[error("A tracked file and a directory both need the path {0}.")]
    PathConflict(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("Incorrect operands.")]
    IncorrectOperands,

    #[error("lock contention on repository")]
    LockContention,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("malformed HEAD: {0}")]
    MalformedHead(String),
}

/// coarse failure classes callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// a blob, commit, branch or file is missing
    NotFound,
    /// the repository is not in a state that allows the operation
    State,
    /// an untracked working file would be clobbered
    ConflictGuard,
    /// stored bytes do not match their key; never retried
    Integrity,
    /// malformed input or repository unavailable
    Usage,
    /// underlying filesystem or encoding failure
    Io,
}

impl Error {
    /// classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ObjectNotFound(_)
            | Error::NoSuchCommit(_)
            | Error::NoCommitWithMessage(_)
            | Error::FileNotFound(_)
            | Error::FileNotInCommit(_)
            | Error::NoSuchBranch(_)
            | Error::NoCommonAncestor(..) => ErrorKind::NotFound,

            Error::NothingToCommit
            | Error::EmptyMessage
            | Error::NoReasonToRemove(_)
            | Error::AlreadyOnBranch(_)
            | Error::CannotRemoveCurrentBranch(_)
            | Error::UncommittedChanges
            | Error::CannotMergeSelf(_)
            | Error::DetachedHead
            | Error::BranchExists(_) => ErrorKind::State,

            Error::UntrackedFileInTheWay(_) | Error::PathConflict(_) => ErrorKind::ConflictGuard,

            Error::CorruptObject(_) | Error::MalformedHead(_) => ErrorKind::Integrity,

            Error::NoRepo(_)
            | Error::RepoExists(_)
            | Error::InvalidBranchName(_)
            | Error::InvalidPath(_)
            | Error::InvalidHashHex(_)
            | Error::IncorrectOperands
            | Error::LockContention => ErrorKind::Usage,

            Error::Io { .. }
            | Error::CborEncode(_)
            | Error::CborDecode(_)
            | Error::Config(_)
            | Error::ConfigSerialize(_) => ErrorKind::Io,
        }
    }

    /// recoverable errors leave no persisted side effects and may be retried by the caller
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Integrity | ErrorKind::Io)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
