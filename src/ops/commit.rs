use chrono::Utc;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::{read_index, write_index};
use crate::repo::Repo;
use crate::types::StagingArea;

/// record the staged changes as a new commit on top of HEAD
pub fn commit(repo: &Repo, message: &str) -> Result<Hash> {
    commit_at(repo, message, Utc::now().timestamp())
}

/// like [`commit`] with an explicit timestamp
///
/// the staging area is cleared only after the commit object is stored and
/// HEAD has moved.
pub fn commit_at(repo: &Repo, message: &str, timestamp: i64) -> Result<Hash> {
    if message.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let _lock = repo.lock()?;

    let (parent_hash, parent) = repo.head_commit()?;
    let index = read_index(repo)?;
    let commit = index.build_commit(parent_hash, &parent, message, timestamp)?;

    let hash = repo.objects().write_commit(&commit)?;
    repo.advance_head(&hash)?;
    write_index(repo, &StagingArea::new())?;

    tracing::info!(%hash, parent = %parent_hash, files = commit.tracked.len(), "committed");
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use crate::ops::add::stage_add;
    use crate::ops::rm::stage_remove;
    use crate::refs::read_ref;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_commit_staged_file() {
        let (dir, repo) = test_repo();
        let root = repo.head_commit_hash().unwrap();

        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        let hash = commit(&repo, "add a").unwrap();

        assert_eq!(read_ref(&repo, "master").unwrap(), hash);
        let c = repo.objects().read_commit(&hash).unwrap();
        assert_eq!(c.parents, vec![root]);
        assert_eq!(c.message, "add a");
        assert_eq!(c.blob("a.txt"), Some(&Hash::of(b"A")));
        assert!(read_index(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_commit_inherits_parent_files() {
        let (dir, repo) = test_repo();

        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        commit(&repo, "add a").unwrap();

        fs::write(dir.path().join("b.txt"), "B").unwrap();
        stage_add(&repo, "b.txt").unwrap();
        let hash = commit(&repo, "add b").unwrap();

        let c = repo.objects().read_commit(&hash).unwrap();
        assert!(c.tracks("a.txt"));
        assert!(c.tracks("b.txt"));
    }

    #[test]
    fn test_commit_nothing_staged() {
        let (_dir, repo) = test_repo();
        let before = repo.head_commit_hash().unwrap();
        let objects_before = repo.objects().store().list(ObjectKind::Commit).unwrap();

        let result = commit(&repo, "empty");

        assert!(matches!(result, Err(Error::NothingToCommit)));
        assert_eq!(repo.head_commit_hash().unwrap(), before);
        assert_eq!(
            repo.objects().store().list(ObjectKind::Commit).unwrap(),
            objects_before
        );
    }

    #[test]
    fn test_commit_empty_message() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();

        assert!(matches!(commit(&repo, "   "), Err(Error::EmptyMessage)));
        assert!(!read_index(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_commit_removal_only() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        commit(&repo, "add a").unwrap();

        stage_remove(&repo, "a.txt").unwrap();
        let hash = commit(&repo, "drop a").unwrap();

        assert!(repo.objects().read_commit(&hash).unwrap().tracked.is_empty());
    }

    #[test]
    fn test_commit_at_is_deterministic_input() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();

        let hash = commit_at(&repo, "fixed", 1_700_000_000).unwrap();
        let c = repo.objects().read_commit(&hash).unwrap();

        assert_eq!(c.timestamp, 1_700_000_000);
        assert_eq!(crate::object::compute_commit_hash(&c).unwrap(), hash);
    }

    #[test]
    fn test_commit_fails_while_locked() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();

        let _held = repo.lock().unwrap();
        assert!(matches!(commit(&repo, "blocked"), Err(Error::LockContention)));
    }
}
