use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{Hash, HEX_LEN};
use crate::repo::Repo;

const HEAD_REF_PREFIX: &str = "ref: ";

/// what HEAD designates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// symbolic: the named branch is checked out
    Branch(String),
    /// a bare commit
    Detached(Hash),
}

/// write a branch ref (create or update)
pub fn write_ref(repo: &Repo, name: &str, hash: &Hash) -> Result<()> {
    validate_branch_name(name)?;

    let path = ref_path(repo, name);
    repo.write_atomic(&path, format!("{}\n", hash.to_hex()).as_bytes())?;

    tracing::debug!(branch = name, %hash, "updated ref");
    Ok(())
}

/// read a branch ref
pub fn read_ref(repo: &Repo, name: &str) -> Result<Hash> {
    validate_branch_name(name)?;
    let path = ref_path(repo, name);

    let content = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NoSuchBranch(name.to_string())
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    Hash::from_hex(content.trim())
}

/// delete a branch ref
pub fn delete_ref(repo: &Repo, name: &str) -> Result<()> {
    validate_branch_name(name)?;
    let path = ref_path(repo, name);

    fs::remove_file(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NoSuchBranch(name.to_string())
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    // drop directories left empty by a nested branch so the prefix can be
    // reused as a branch name
    let refs_dir = repo.refs_path();
    let mut dir = path.parent();
    while let Some(d) = dir {
        if d == refs_dir || fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }

    Ok(())
}

/// check if a branch exists
pub fn ref_exists(repo: &Repo, name: &str) -> bool {
    validate_branch_name(name).is_ok() && ref_path(repo, name).is_file()
}

/// list all branches, sorted
pub fn list_refs(repo: &Repo) -> Result<Vec<String>> {
    let refs_dir = repo.refs_path();
    let mut refs = Vec::new();

    if refs_dir.exists() {
        collect_refs(&refs_dir, &refs_dir, &mut refs)?;
    }

    refs.sort();
    Ok(refs)
}

/// read HEAD
pub fn read_head(repo: &Repo) -> Result<Head> {
    let path = repo.head_path();
    let content = fs::read_to_string(&path).with_path(&path)?;
    parse_head(content.trim())
}

/// write HEAD
pub fn write_head(repo: &Repo, head: &Head) -> Result<()> {
    let content = match head {
        Head::Branch(name) => {
            validate_branch_name(name)?;
            format!("{}{}\n", HEAD_REF_PREFIX, name)
        }
        Head::Detached(hash) => format!("{}\n", hash.to_hex()),
    };
    repo.write_atomic(&repo.head_path(), content.as_bytes())
}

fn parse_head(content: &str) -> Result<Head> {
    if let Some(name) = content.strip_prefix(HEAD_REF_PREFIX) {
        validate_branch_name(name).map_err(|_| Error::MalformedHead(content.to_string()))?;
        return Ok(Head::Branch(name.to_string()));
    }

    if content.len() == HEX_LEN {
        if let Ok(hash) = Hash::from_hex(content) {
            return Ok(Head::Detached(hash));
        }
    }

    Err(Error::MalformedHead(content.to_string()))
}

/// get filesystem path for a ref
fn ref_path(repo: &Repo, name: &str) -> PathBuf {
    repo.refs_path().join(name)
}

/// recursively collect refs from directory
fn collect_refs(base: &Path, dir: &Path, refs: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();

        if path.is_dir() {
            collect_refs(base, &path, refs)?;
        } else if path.is_file() {
            if let Ok(rel) = path.strip_prefix(base) {
                refs.push(rel.to_string_lossy().to_string());
            }
        }
    }
    Ok(())
}

/// validate a branch name
///
/// names may be hierarchical (`feature/x`) but cannot escape the refs
/// directory.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidBranchName("empty branch name".to_string()));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot start or end with '/': {}",
            name
        )));
    }

    if name.contains("//") || name.contains('\0') || name.contains('\\') {
        return Err(Error::InvalidBranchName(format!(
            "branch name contains an illegal sequence: {}",
            name
        )));
    }

    if name.chars().any(|c| c.is_whitespace()) {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain whitespace: {}",
            name
        )));
    }

    // check for path traversal
    for component in name.split('/') {
        if component == "." || component == ".." {
            return Err(Error::InvalidBranchName(format!(
                "branch name cannot contain '.' or '..': {}",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_write_and_read_ref() {
        let (_dir, repo) = test_repo();

        let hash = Hash::of(b"commit");
        write_ref(&repo, "feature", &hash).unwrap();

        assert_eq!(read_ref(&repo, "feature").unwrap(), hash);
    }

    #[test]
    fn test_hierarchical_ref() {
        let (_dir, repo) = test_repo();

        write_ref(&repo, "feature/login", &Hash::ZERO).unwrap();

        assert_eq!(read_ref(&repo, "feature/login").unwrap(), Hash::ZERO);
        assert!(list_refs(&repo).unwrap().contains(&"feature/login".to_string()));
    }

    #[test]
    fn test_delete_ref() {
        let (_dir, repo) = test_repo();

        write_ref(&repo, "temp", &Hash::ZERO).unwrap();
        assert!(ref_exists(&repo, "temp"));

        delete_ref(&repo, "temp").unwrap();
        assert!(!ref_exists(&repo, "temp"));
    }

    #[test]
    fn test_delete_nested_ref_prunes_dirs() {
        let (_dir, repo) = test_repo();

        write_ref(&repo, "feature/a", &Hash::ZERO).unwrap();
        write_ref(&repo, "feature/b", &Hash::ZERO).unwrap();

        delete_ref(&repo, "feature/a").unwrap();
        // sibling still holds the directory
        assert!(repo.refs_path().join("feature").is_dir());

        delete_ref(&repo, "feature/b").unwrap();
        assert!(!repo.refs_path().join("feature").exists());
        assert!(repo.refs_path().is_dir());

        write_ref(&repo, "feature", &Hash::ZERO).unwrap();
        assert!(ref_exists(&repo, "feature"));
    }

    #[test]
    fn test_missing_ref() {
        let (_dir, repo) = test_repo();

        assert!(matches!(delete_ref(&repo, "nope"), Err(Error::NoSuchBranch(_))));
        assert!(matches!(read_ref(&repo, "nope"), Err(Error::NoSuchBranch(_))));
    }

    #[test]
    fn test_list_refs_sorted() {
        let (_dir, repo) = test_repo();

        write_ref(&repo, "zeta", &Hash::ZERO).unwrap();
        write_ref(&repo, "alpha", &Hash::ZERO).unwrap();

        assert_eq!(
            list_refs(&repo).unwrap(),
            vec!["alpha".to_string(), "master".to_string(), "zeta".to_string()]
        );
    }

    #[test]
    fn test_head_roundtrip() {
        let (_dir, repo) = test_repo();

        write_head(&repo, &Head::Branch("other".to_string())).unwrap();
        assert_eq!(read_head(&repo).unwrap(), Head::Branch("other".to_string()));

        let hash = Hash::of(b"detached");
        write_head(&repo, &Head::Detached(hash)).unwrap();
        assert_eq!(read_head(&repo).unwrap(), Head::Detached(hash));
    }

    #[test]
    fn test_malformed_head() {
        let (_dir, repo) = test_repo();

        fs::write(repo.head_path(), "garbage\n").unwrap();
        assert!(matches!(read_head(&repo), Err(Error::MalformedHead(_))));
    }

    #[test]
    fn test_invalid_branch_names() {
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("/start").is_err());
        assert!(validate_branch_name("end/").is_err());
        assert!(validate_branch_name("double//slash").is_err());
        assert!(validate_branch_name("with/../dotdot").is_err());
        assert!(validate_branch_name("..").is_err());
        assert!(validate_branch_name("has space").is_err());
        assert!(validate_branch_name("with\0null").is_err());

        // valid names
        assert!(validate_branch_name("master").is_ok());
        assert!(validate_branch_name("feature/x").is_ok());
    }

    #[test]
    fn test_overwrite_ref() {
        let (_dir, repo) = test_repo();

        write_ref(&repo, "myref", &Hash::of(b"1")).unwrap();
        write_ref(&repo, "myref", &Hash::of(b"2")).unwrap();

        assert_eq!(read_ref(&repo, "myref").unwrap(), Hash::of(b"2"));
    }
}
