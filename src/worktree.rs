//! working-directory access
//!
//! tracked paths are relative, `/`-separated strings. everything under the
//! metadata directory is invisible to the working tree.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::object::compute_blob_hash;
use crate::repo::META_DIR;

#[derive(Debug, Clone)]
pub struct Worktree {
    root: PathBuf,
}

impl Worktree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// absolute location of a tracked path
    pub fn resolve(&self, rel: &str) -> Result<PathBuf> {
        validate_path(rel)?;
        Ok(self.root.join(rel))
    }

    /// true if a regular file exists at `rel`
    pub fn exists(&self, rel: &str) -> Result<bool> {
        Ok(self.resolve(rel)?.is_file())
    }

    /// file content, None when there is no regular file at `rel`
    pub fn read(&self, rel: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(rel)?;
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path).with_path(&path).map(Some)
    }

    /// blob hash of the file at `rel`
    pub fn hash(&self, rel: &str) -> Result<Option<Hash>> {
        Ok(self.read(rel)?.map(|content| compute_blob_hash(&content)))
    }

    /// write a file, creating parent directories
    ///
    /// an empty directory tree at `rel` is replaced; one holding files is an
    /// error.
    pub fn write(&self, rel: &str, content: &[u8]) -> Result<()> {
        let path = self.resolve(rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }
        if is_dir(&path) {
            for entry in WalkDir::new(&path).contents_first(true) {
                let entry = entry.map_err(|e| walk_error(&path, e))?;
                fs::remove_dir(entry.path()).with_path(entry.path())?;
            }
        }
        fs::write(&path, content).with_path(&path)
    }

    /// first working file that stops a file being written at `rel`
    ///
    /// that is a file where a parent directory is needed, or a file inside a
    /// directory sitting at `rel`. paths in `leaving` are about to be deleted
    /// and never count.
    pub fn obstacle(&self, rel: &str, leaving: &BTreeSet<String>) -> Result<Option<String>> {
        let path = self.resolve(rel)?;

        let segments: Vec<&str> = rel.split('/').collect();
        for depth in 1..segments.len() {
            let prefix = segments[..depth].join("/");
            let ancestor = self.root.join(&prefix);
            match fs::symlink_metadata(&ancestor) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) if leaving.contains(&prefix) => return Ok(None),
                Ok(_) => return Ok(Some(prefix)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(source) => {
                    return Err(Error::Io {
                        path: ancestor,
                        source,
                    })
                }
            }
        }

        if !is_dir(&path) {
            return Ok(None);
        }
        for entry in WalkDir::new(&path).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(&path, e))?;
            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(inner) = self.relative(entry.path()) {
                if !leaving.contains(&inner) {
                    return Ok(Some(inner));
                }
            }
        }

        Ok(None)
    }

    /// delete a file and any directories it leaves empty
    ///
    /// returns false if there was nothing to delete.
    pub fn remove(&self, rel: &str) -> Result<bool> {
        let path = self.resolve(rel)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(source) => return Err(Error::Io { path, source }),
        }

        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.root || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }

        Ok(true)
    }

    /// every regular file in the working tree, sorted
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| !(e.depth() == 1 && e.file_name() == META_DIR));

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(&self.root, e))?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(rel) = self.relative(entry.path()) {
                files.push(rel);
            }
        }

        files.sort();
        Ok(files)
    }

    /// `/`-joined path of `path` below the root
    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(parts.join("/"))
    }
}

fn is_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

fn walk_error(path: &Path, e: walkdir::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source: e
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("walkdir error")),
    }
}

/// reject paths that are empty, absolute, escape the working tree or
/// point into the metadata directory
pub fn validate_path(rel: &str) -> Result<()> {
    let invalid = || Error::InvalidPath(rel.to_string());

    if rel.is_empty() || rel.contains('\0') || rel.contains('\\') {
        return Err(invalid());
    }

    // keys must be canonical: no empty, "." or ".." segments
    if rel.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return Err(invalid());
    }

    let path = Path::new(rel);
    for (i, component) in path.components().enumerate() {
        match component {
            Component::Normal(name) => {
                if i == 0 && name == META_DIR {
                    return Err(invalid());
                }
            }
            _ => return Err(invalid()),
        }
    }

    Ok(())
}
