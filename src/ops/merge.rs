//! three-way merge of another branch into the current one
//!
//! the merge base is the split point of the two branch tips. every path seen
//! in the base or either tip is classified by comparing its blob across the
//! three snapshots; the working tree is only touched once the whole plan is
//! known and the untracked-file guard has passed.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::{read_index, write_index};
use crate::object::compute_blob_hash;
use crate::ops::checkout::{check_untracked, leaving_paths, replay_commit};
use crate::refs::{read_ref, write_ref};
use crate::repo::Repo;
use crate::types::{Commit, StagingArea};

/// how a merge ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// the given branch is already contained in the current one
    AlreadyUpToDate,
    /// the current branch was moved forward to this commit; no merge commit
    FastForwarded(Hash),
    /// a two-parent merge commit was recorded
    Merged { commit: Hash, conflicted: bool },
}

impl MergeOutcome {
    pub fn is_conflicted(&self) -> bool {
        matches!(self, MergeOutcome::Merged { conflicted: true, .. })
    }

    /// the line a front end reports for this outcome, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            MergeOutcome::AlreadyUpToDate => {
                Some("Given branch is an ancestor of the current branch.")
            }
            MergeOutcome::FastForwarded(_) => Some("Current branch fast-forwarded."),
            MergeOutcome::Merged {
                conflicted: true, ..
            } => Some("Encountered a merge conflict."),
            MergeOutcome::Merged { .. } => None,
        }
    }
}

/// per-path decision of a three-way merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// leave the current branch's version (or absence) as is
    KeepOurs,
    /// take the other branch's blob and stage it
    TakeTheirs(Hash),
    /// delete the path and stage its removal
    Delete,
    /// both sides changed it differently
    Conflict,
}

/// classify one path given its blob in the split point, ours and theirs
pub fn classify(split: Option<&Hash>, ours: Option<&Hash>, theirs: Option<&Hash>) -> MergeAction {
    if ours == theirs {
        // unchanged, changed identically, or deleted on both sides
        return MergeAction::KeepOurs;
    }
    if ours == split {
        return match theirs {
            Some(hash) => MergeAction::TakeTheirs(*hash),
            None => MergeAction::Delete,
        };
    }
    if theirs == split {
        return MergeAction::KeepOurs;
    }
    MergeAction::Conflict
}

/// working-file content recorded for a conflicted path
///
/// a side that does not have the file contributes nothing between its
/// markers.
pub fn conflict_content(ours: &[u8], theirs: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ours.len() + theirs.len() + 32);
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    out.extend_from_slice(ours);
    out.extend_from_slice(b"=======\n");
    out.extend_from_slice(theirs);
    out.extend_from_slice(b">>>>>>>\n");
    out
}

/// merge branch `name` into the current branch
pub fn merge(repo: &Repo, name: &str) -> Result<MergeOutcome> {
    merge_at(repo, name, Utc::now().timestamp())
}

/// like [`merge`] with an explicit timestamp for the merge commit
pub fn merge_at(repo: &Repo, name: &str, timestamp: i64) -> Result<MergeOutcome> {
    let _lock = repo.lock()?;

    let index = read_index(repo)?;
    if !index.is_empty() {
        return Err(Error::UncommittedChanges);
    }

    // a name that can never be a branch is simply not one
    let theirs_hash = read_ref(repo, name).map_err(|e| match e {
        Error::InvalidBranchName(_) => Error::NoSuchBranch(name.to_string()),
        other => other,
    })?;
    let current_branch = repo.current_branch()?.ok_or(Error::DetachedHead)?;
    if current_branch == name {
        return Err(Error::CannotMergeSelf(name.to_string()));
    }

    let objects = repo.objects();
    let (ours_hash, ours) = repo.head_commit()?;
    let split_hash = objects.find_split_point(&ours_hash, &theirs_hash)?;

    if split_hash == theirs_hash {
        tracing::info!(branch = name, "already up to date");
        return Ok(MergeOutcome::AlreadyUpToDate);
    }

    let theirs = objects.read_commit(&theirs_hash)?;
    let worktree = repo.worktree();

    if split_hash == ours_hash {
        let leaving = leaving_paths(&ours, &theirs);
        check_untracked(&worktree, &ours, &index, &theirs.tracked, &leaving)?;
        replay_commit(repo, &ours, &theirs)?;
        write_ref(repo, &current_branch, &theirs_hash)?;

        tracing::info!(branch = %current_branch, commit = %theirs_hash, "fast-forwarded");
        return Ok(MergeOutcome::FastForwarded(theirs_hash));
    }

    let split = objects.read_commit(&split_hash)?;
    let plan = plan_merge(repo, &split, &ours, &theirs)?;

    // nothing on disk changes until the guard has passed
    let incoming: BTreeMap<String, Hash> = plan
        .writes
        .iter()
        .map(|(path, content)| (path.clone(), compute_blob_hash(content)))
        .collect();
    check_untracked(&worktree, &ours, &index, &incoming, &plan.deletes)?;

    for content in plan.writes.values() {
        objects.write_blob(content)?;
    }
    // deletions first so a file can give way to a directory of the same name
    for path in &plan.deletes {
        worktree.remove(path)?;
    }
    for (path, content) in &plan.writes {
        worktree.write(path, content)?;
    }

    let commit = Commit::with_timestamp(
        vec![ours_hash, theirs_hash],
        plan.staged.apply(&ours.tracked),
        timestamp,
        format!("Merged {} into {}.", name, current_branch),
    );
    let commit_hash = objects.write_commit(&commit)?;
    write_ref(repo, &current_branch, &commit_hash)?;
    write_index(repo, &StagingArea::new())?;

    if plan.conflicted {
        tracing::warn!(branch = name, "merge recorded with conflicts");
    }
    tracing::info!(
        branch = %current_branch,
        commit = %commit_hash,
        split = %split_hash,
        "merged"
    );

    Ok(MergeOutcome::Merged {
        commit: commit_hash,
        conflicted: plan.conflicted,
    })
}

/// everything a non-trivial merge will do, computed up front
struct MergePlan {
    staged: StagingArea,
    writes: BTreeMap<String, Vec<u8>>,
    deletes: BTreeSet<String>,
    conflicted: bool,
}

fn plan_merge(repo: &Repo, split: &Commit, ours: &Commit, theirs: &Commit) -> Result<MergePlan> {
    let objects = repo.objects();
    let paths: BTreeSet<&String> = split
        .tracked
        .keys()
        .chain(ours.tracked.keys())
        .chain(theirs.tracked.keys())
        .collect();

    let mut plan = MergePlan {
        staged: StagingArea::new(),
        writes: BTreeMap::new(),
        deletes: BTreeSet::new(),
        conflicted: false,
    };

    for path in paths {
        let (s, o, t) = (split.blob(path), ours.blob(path), theirs.blob(path));
        let action = classify(s, o, t);
        tracing::debug!(path = path.as_str(), ?action, "merge decision");

        match action {
            MergeAction::KeepOurs => {}
            MergeAction::TakeTheirs(hash) => {
                plan.writes.insert(path.clone(), objects.read_blob(&hash)?);
                plan.staged.stage_addition(path.clone(), hash);
            }
            MergeAction::Delete => {
                plan.deletes.insert(path.clone());
                plan.staged.stage_removal(path.clone());
            }
            MergeAction::Conflict => {
                let ours_content = match o {
                    Some(hash) => objects.read_blob(hash)?,
                    None => Vec::new(),
                };
                let theirs_content = match t {
                    Some(hash) => objects.read_blob(hash)?,
                    None => Vec::new(),
                };
                let content = conflict_content(&ours_content, &theirs_content);
                plan.staged
                    .stage_addition(path.clone(), compute_blob_hash(&content));
                plan.writes.insert(path.clone(), content);
                plan.conflicted = true;
                tracing::warn!(path = path.as_str(), "merge conflict");
            }
        }
    }

    Ok(plan)
}
