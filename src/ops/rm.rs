use crate::error::{Error, Result};
use crate::index::{read_index, write_index};
use crate::repo::Repo;
use crate::worktree::validate_path;

/// stop tracking `path`
///
/// a path tracked by HEAD is staged for removal and deleted from the working
/// tree. a path that is only staged for addition is unstaged and left on disk.
pub fn stage_remove(repo: &Repo, path: &str) -> Result<()> {
    validate_path(path)?;
    let _lock = repo.lock()?;

    let (_, head) = repo.head_commit()?;
    let mut index = read_index(repo)?;

    if head.tracks(path) {
        index.stage_removal(path);
        write_index(repo, &index)?;
        repo.worktree().remove(path)?;
        tracing::debug!(path, "staged for removal");
    } else if index.is_staged_for_addition(path) {
        index.unstage(path);
        write_index(repo, &index)?;
        tracing::debug!(path, "unstaged");
    } else {
        return Err(Error::NoReasonToRemove(path.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add::stage_add;
    use crate::ops::commit::commit;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_remove_tracked_file() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        commit(&repo, "add a").unwrap();

        stage_remove(&repo, "a.txt").unwrap();

        assert!(!dir.path().join("a.txt").exists());
        assert!(read_index(&repo).unwrap().is_staged_for_removal("a.txt"));

        commit(&repo, "remove a").unwrap();
        let (_, head) = repo.head_commit().unwrap();
        assert!(!head.tracks("a.txt"));
    }

    #[test]
    fn test_remove_tracked_file_already_deleted() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        commit(&repo, "add a").unwrap();
        fs::remove_file(dir.path().join("a.txt")).unwrap();

        stage_remove(&repo, "a.txt").unwrap();
        assert!(read_index(&repo).unwrap().is_staged_for_removal("a.txt"));
    }

    #[test]
    fn test_remove_staged_only_keeps_file() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("new.txt"), "N").unwrap();
        stage_add(&repo, "new.txt").unwrap();

        stage_remove(&repo, "new.txt").unwrap();

        assert!(dir.path().join("new.txt").exists());
        assert!(read_index(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_remove_without_reason() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("loose.txt"), "L").unwrap();

        let result = stage_remove(&repo, "loose.txt");

        assert!(matches!(result, Err(Error::NoReasonToRemove(_))));
        assert!(dir.path().join("loose.txt").exists());
    }
}
