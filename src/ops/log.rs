use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::repo::Repo;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// history from HEAD following first parents only, newest first
pub fn log(repo: &Repo) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    let mut next = Some(repo.head_commit_hash()?);

    while let Some(hash) = next {
        let commit = repo.objects().read_commit(&hash)?;
        next = commit.first_parent().copied();
        entries.push(LogEntry { hash, commit });
    }

    Ok(entries)
}

/// every commit ever made, reachable or not, newest first
pub fn global_log(repo: &Repo) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();

    for hash in repo.objects().list_commits()? {
        let commit = repo.objects().read_commit(&hash)?;
        entries.push(LogEntry { hash, commit });
    }

    entries.sort_by(|a, b| {
        b.commit
            .timestamp
            .cmp(&a.commit.timestamp)
            .then_with(|| a.hash.cmp(&b.hash))
    });
    Ok(entries)
}

/// ids of every commit whose message is exactly `message`
pub fn find(repo: &Repo, message: &str) -> Result<Vec<Hash>> {
    let matches: Vec<Hash> = global_log(repo)?
        .into_iter()
        .filter(|e| e.commit.message == message)
        .map(|e| e.hash)
        .collect();

    if matches.is_empty() {
        return Err(Error::NoCommitWithMessage(message.to_string()));
    }
    Ok(matches)
}

/// gitlet-style log block
impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.hash)?;
        if let [first, second, ..] = self.commit.parents.as_slice() {
            writeln!(f, "Merge: {} {}", first.short(), second.short())?;
        }
        writeln!(
            f,
            "Date: {}",
            self.commit.date().format("%a %b %-d %H:%M:%S %Y %z")
        )?;
        writeln!(f, "{}", self.commit.message)?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add::stage_add;
    use crate::ops::commit::{commit, commit_at};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_file(dir: &std::path::Path, repo: &Repo, name: &str, content: &str, msg: &str) -> Hash {
        fs::write(dir.join(name), content).unwrap();
        stage_add(repo, name).unwrap();
        commit(repo, msg).unwrap()
    }

    #[test]
    fn test_log_first_parent_chain() {
        let (dir, repo) = test_repo();

        let c1 = commit_file(dir.path(), &repo, "f.txt", "v1", "commit 1");
        let c2 = commit_file(dir.path(), &repo, "f.txt", "v2", "commit 2");

        let entries = log(&repo).unwrap();
        let hashes: Vec<Hash> = entries.iter().map(|e| e.hash).collect();

        assert_eq!(entries.len(), 3);
        assert_eq!(hashes[0], c2);
        assert_eq!(hashes[1], c1);
        assert_eq!(entries[2].commit.message, "initial commit");
    }

    #[test]
    fn test_global_log_and_find() {
        let (dir, repo) = test_repo();

        let a = commit_file(dir.path(), &repo, "a.txt", "A", "same message");
        let b = commit_file(dir.path(), &repo, "b.txt", "B", "same message");
        commit_file(dir.path(), &repo, "c.txt", "C", "other");

        assert_eq!(global_log(&repo).unwrap().len(), 4);

        let mut found = find(&repo, "same message").unwrap();
        found.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_find_nothing() {
        let (_dir, repo) = test_repo();

        assert!(matches!(
            find(&repo, "never written"),
            Err(Error::NoCommitWithMessage(_))
        ));
    }

    #[test]
    fn test_log_entry_display() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        stage_add(&repo, "a.txt").unwrap();
        let hash = commit_at(&repo, "test message", 0).unwrap();

        let entries = log(&repo).unwrap();
        let display = format!("{}", entries[0]);

        assert_eq!(
            display,
            format!(
                "===\ncommit {}\nDate: Thu Jan 1 00:00:00 1970 +0000\ntest message\n\n",
                hash
            )
        );
    }

    #[test]
    fn test_merge_entry_display() {
        let p1 = Hash::of(b"p1");
        let p2 = Hash::of(b"p2");
        let entry = LogEntry {
            hash: Hash::of(b"m"),
            commit: Commit::with_timestamp(vec![p1, p2], BTreeMap::new(), 0, "Merged x into y."),
        };

        let display = entry.to_string();
        assert!(display.contains(&format!("Merge: {} {}\n", p1.short(), p2.short())));
    }
}
