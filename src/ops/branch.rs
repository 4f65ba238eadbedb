use crate::error::{Error, Result};
use crate::refs::{delete_ref, list_refs, read_ref, ref_exists, validate_branch_name, write_ref};
use crate::repo::Repo;

/// point a new branch at the HEAD commit
pub fn create_branch(repo: &Repo, name: &str) -> Result<()> {
    validate_branch_name(name)?;
    let _lock = repo.lock()?;

    if ref_exists(repo, name) {
        return Err(Error::BranchExists(name.to_string()));
    }

    let head = repo.head_commit_hash()?;
    write_ref(repo, name, &head)?;

    tracing::info!(branch = name, commit = %head, "created branch");
    Ok(())
}

/// delete a branch pointer; its commits are kept
pub fn remove_branch(repo: &Repo, name: &str) -> Result<()> {
    let _lock = repo.lock()?;

    // surface a missing branch before comparing with HEAD
    read_ref(repo, name)?;

    if repo.current_branch()?.as_deref() == Some(name) {
        return Err(Error::CannotRemoveCurrentBranch(name.to_string()));
    }

    delete_ref(repo, name)?;
    tracing::info!(branch = name, "removed branch");
    Ok(())
}

/// all branch names, sorted
pub fn list_branches(repo: &Repo) -> Result<Vec<String>> {
    list_refs(repo)
}
