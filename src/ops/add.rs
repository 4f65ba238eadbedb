use crate::error::{Error, Result};
use crate::index::{read_index, write_index};
use crate::object::compute_blob_hash;
use crate::repo::Repo;

/// stage the working copy of `path` for the next commit
///
/// content identical to HEAD's version is never staged; any stale addition
/// or removal mark for the path is dropped instead.
pub fn stage_add(repo: &Repo, path: &str) -> Result<()> {
    let _lock = repo.lock()?;

    let content = repo
        .worktree()
        .read(path)?
        .ok_or_else(|| Error::FileNotFound(path.to_string()))?;

    let (_, head) = repo.head_commit()?;
    let mut index = read_index(repo)?;
    let hash = compute_blob_hash(&content);

    if head.blob(path) == Some(&hash) {
        if index.unstage(path) {
            tracing::debug!(path, "content matches HEAD, unstaged");
        }
    } else {
        repo.objects().write_blob(&content)?;
        index.stage_addition(path, hash);
        tracing::debug!(path, %hash, "staged for addition");
    }

    write_index(repo, &index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::commit::commit;
    use crate::ops::rm::stage_remove;
    use crate::Hash;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_stage_new_file() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();

        stage_add(&repo, "a.txt").unwrap();

        let index = read_index(&repo).unwrap();
        assert_eq!(index.addition.get("a.txt"), Some(&Hash::of(b"hello")));
        assert_eq!(
            repo.objects().read_blob(&Hash::of(b"hello")).unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_stage_missing_file() {
        let (_dir, repo) = test_repo();

        let result = stage_add(&repo, "missing.txt");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
        assert!(read_index(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_stage_unchanged_file_is_noop() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "v1").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        commit(&repo, "add a").unwrap();

        stage_add(&repo, "a.txt").unwrap();
        assert!(read_index(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_stage_reverted_file_drops_stale_entry() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "v1").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        commit(&repo, "add a").unwrap();

        fs::write(dir.path().join("a.txt"), "v2").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        assert!(read_index(&repo).unwrap().is_staged_for_addition("a.txt"));

        fs::write(dir.path().join("a.txt"), "v1").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        assert!(read_index(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_stage_restored_file_clears_removal() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "v1").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        commit(&repo, "add a").unwrap();

        stage_remove(&repo, "a.txt").unwrap();
        assert!(read_index(&repo).unwrap().is_staged_for_removal("a.txt"));

        fs::write(dir.path().join("a.txt"), "v1").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        assert!(read_index(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_stage_rejects_bad_path() {
        let (_dir, repo) = test_repo();

        assert!(matches!(
            stage_add(&repo, "../outside"),
            Err(Error::InvalidPath(_))
        ));
    }
}
