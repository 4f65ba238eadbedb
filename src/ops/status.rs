use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::index::read_index;
use crate::refs::list_refs;
use crate::repo::Repo;

/// why a working file differs from what the next commit would record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modification {
    Modified,
    Deleted,
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modification::Modified => write!(f, "modified"),
            Modification::Deleted => write!(f, "deleted"),
        }
    }
}

/// snapshot of branches, staging area and working tree; every list is sorted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub branches: Vec<String>,
    /// None when HEAD is detached
    pub current_branch: Option<String>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<(String, Modification)>,
    pub untracked: Vec<String>,
}

/// compare HEAD, the staging area and the working tree without changing any
pub fn status(repo: &Repo) -> Result<Status> {
    let (_, head) = repo.head_commit()?;
    let index = read_index(repo)?;
    let worktree = repo.worktree();

    let mut modified = BTreeMap::new();

    for (path, staged) in &index.addition {
        match worktree.hash(path)? {
            None => {
                modified.insert(path.clone(), Modification::Deleted);
            }
            Some(current) if current != *staged => {
                modified.insert(path.clone(), Modification::Modified);
            }
            Some(_) => {}
        }
    }

    for (path, committed) in &head.tracked {
        if index.is_staged_for_addition(path) || index.is_staged_for_removal(path) {
            continue;
        }
        match worktree.hash(path)? {
            None => {
                modified.insert(path.clone(), Modification::Deleted);
            }
            Some(current) if current != *committed => {
                modified.insert(path.clone(), Modification::Modified);
            }
            Some(_) => {}
        }
    }

    let untracked = worktree
        .list_files()?
        .into_iter()
        .filter(|path| {
            !index.is_staged_for_addition(path)
                && (!head.tracks(path) || index.is_staged_for_removal(path))
        })
        .collect();

    Ok(Status {
        branches: list_refs(repo)?,
        current_branch: repo.current_branch()?,
        staged: index.addition.keys().cloned().collect(),
        removed: index.removal.iter().cloned().collect(),
        modified: modified.into_iter().collect(),
        untracked,
    })
}

/// gitlet-style status report
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Branches ===")?;
        for branch in &self.branches {
            if self.current_branch.as_deref() == Some(branch.as_str()) {
                writeln!(f, "*{}", branch)?;
            } else {
                writeln!(f, "{}", branch)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "=== Staged Files ===")?;
        for path in &self.staged {
            writeln!(f, "{}", path)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Removed Files ===")?;
        for path in &self.removed {
            writeln!(f, "{}", path)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Modifications Not Staged For Commit ===")?;
        for (path, kind) in &self.modified {
            writeln!(f, "{} ({})", path, kind)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Untracked Files ===")?;
        for path in &self.untracked {
            writeln!(f, "{}", path)?;
        }
        writeln!(f)
    }
}
