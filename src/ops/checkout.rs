use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::{read_index, write_index};
use crate::refs::{read_ref, write_head, Head};
use crate::repo::Repo;
use crate::types::{Commit, StagingArea};
use crate::worktree::Worktree;

/// check out another branch, replacing the working tree with its snapshot
pub fn switch_branch(repo: &Repo, name: &str) -> Result<()> {
    let _lock = repo.lock()?;

    let target_hash = read_ref(repo, name)?;
    if repo.current_branch()?.as_deref() == Some(name) {
        return Err(Error::AlreadyOnBranch(name.to_string()));
    }

    let (_, current) = repo.head_commit()?;
    let target = repo.objects().read_commit(&target_hash)?;
    let index = read_index(repo)?;

    let leaving = leaving_paths(&current, &target);
    check_untracked(&repo.worktree(), &current, &index, &target.tracked, &leaving)?;
    replay_commit(repo, &current, &target)?;

    write_head(repo, &Head::Branch(name.to_string()))?;
    write_index(repo, &StagingArea::new())?;

    tracing::info!(branch = name, commit = %target_hash, "switched branch");
    Ok(())
}

/// restore `path` from the HEAD commit
pub fn checkout_file(repo: &Repo, path: &str) -> Result<()> {
    let _lock = repo.lock()?;
    let (_, head) = repo.head_commit()?;
    restore_file(repo, &head, path)
}

/// restore `path` from the commit named by `commit_id` (full or abbreviated)
pub fn checkout_file_from_commit(repo: &Repo, commit_id: &str, path: &str) -> Result<()> {
    let _lock = repo.lock()?;
    let hash = repo.objects().resolve_commit(commit_id)?;
    let commit = repo.objects().read_commit(&hash)?;
    restore_file(repo, &commit, path)
}

/// move HEAD to an arbitrary commit and replay its snapshot
pub fn reset(repo: &Repo, commit_id: &str) -> Result<()> {
    let _lock = repo.lock()?;

    let target_hash = repo.objects().resolve_commit(commit_id)?;
    let target = repo.objects().read_commit(&target_hash)?;
    let (_, current) = repo.head_commit()?;
    let index = read_index(repo)?;

    let leaving = leaving_paths(&current, &target);
    check_untracked(&repo.worktree(), &current, &index, &target.tracked, &leaving)?;
    replay_commit(repo, &current, &target)?;

    repo.advance_head(&target_hash)?;
    write_index(repo, &StagingArea::new())?;

    tracing::info!(commit = %target_hash, "reset");
    Ok(())
}

fn restore_file(repo: &Repo, commit: &Commit, path: &str) -> Result<()> {
    let hash = commit
        .blob(path)
        .ok_or_else(|| Error::FileNotInCommit(path.to_string()))?;
    let content = repo.objects().read_blob(hash)?;
    repo.worktree().write(path, &content)
}

/// paths `current` tracks that `target` does not
pub(crate) fn leaving_paths(current: &Commit, target: &Commit) -> BTreeSet<String> {
    current
        .tracked
        .keys()
        .filter(|path| !target.tracks(path))
        .cloned()
        .collect()
}

/// fail if writing `incoming` would clobber an untracked working file or
/// cannot be placed at all
///
/// a file is untracked when the current commit does not track it and it is
/// not staged for addition. identical content is not in the way. files in
/// `leaving` are deleted before anything is written, so they never block a
/// path.
pub(crate) fn check_untracked(
    worktree: &Worktree,
    current: &Commit,
    index: &StagingArea,
    incoming: &BTreeMap<String, Hash>,
    leaving: &BTreeSet<String>,
) -> Result<()> {
    for (path, hash) in incoming {
        if let Some(blocker) = worktree.obstacle(path, leaving)? {
            tracing::debug!(path = path.as_str(), blocker = blocker.as_str(), "path blocked");
            if current.tracks(&blocker) || index.is_staged_for_addition(&blocker) {
                return Err(Error::PathConflict(path.clone()));
            }
            return Err(Error::UntrackedFileInTheWay(blocker));
        }
        if current.tracks(path) || index.is_staged_for_addition(path) {
            continue;
        }
        if let Some(existing) = worktree.hash(path)? {
            if existing != *hash {
                tracing::debug!(path = path.as_str(), "untracked file in the way");
                return Err(Error::UntrackedFileInTheWay(path.clone()));
            }
        }
    }
    Ok(())
}

/// make the working tree match `target`, given it currently reflects `current`
///
/// every blob is loaded before the first write so a missing or corrupt
/// object aborts without touching the working tree. files leaving the
/// snapshot go first, clearing the way when a file and a directory trade
/// places.
pub(crate) fn replay_commit(repo: &Repo, current: &Commit, target: &Commit) -> Result<()> {
    let worktree = repo.worktree();

    let mut writes = Vec::new();
    for (path, hash) in &target.tracked {
        if worktree.hash(path)?.as_ref() != Some(hash) {
            writes.push((path, repo.objects().read_blob(hash)?));
        }
    }

    for path in leaving_paths(current, target) {
        worktree.remove(&path)?;
    }

    for (path, content) in writes {
        worktree.write(path, &content)?;
    }

    Ok(())
}
