use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::fs::atomic_write;
use crate::hash::{is_hex_prefix, Hash, HEX_LEN};

/// the two kinds of object kept in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl ObjectKind {
    /// subdirectory of `objects/` holding this kind
    pub fn dir_name(self) -> &'static str {
        match self {
            ObjectKind::Blob => "blobs",
            ObjectKind::Commit => "commits",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Blob => write!(f, "blob"),
            ObjectKind::Commit => write!(f, "commit"),
        }
    }
}

/// content-addressed object storage rooted at an `objects/` directory
///
/// objects are keyed by the digest of their uncompressed bytes and stored
/// zstd-compressed under a two-character fan-out directory. writes are
/// idempotent; every read re-verifies the digest.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    root: PathBuf,
    tmp: PathBuf,
    compression_level: i32,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>, tmp: impl Into<PathBuf>, compression_level: i32) -> Self {
        Self {
            root: root.into(),
            tmp: tmp.into(),
            compression_level,
        }
    }

    /// path to the objects directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// get the filesystem path to an object
    pub fn object_path(&self, kind: ObjectKind, hash: &Hash) -> PathBuf {
        let (dir, file) = hash.to_path_components();
        self.root.join(kind.dir_name()).join(dir).join(file)
    }

    /// store bytes, returning their hash
    pub fn put(&self, kind: ObjectKind, bytes: &[u8]) -> Result<Hash> {
        let hash = Hash::of(bytes);
        let path = self.object_path(kind, &hash);

        // dedup: identical content always lands on the same key
        if path.exists() {
            tracing::trace!(%kind, %hash, "object already stored");
            return Ok(hash);
        }

        let compressed =
            zstd::encode_all(bytes, self.compression_level).map_err(|e| Error::Io {
                path: PathBuf::from("<zstd>"),
                source: e,
            })?;

        atomic_write(&self.tmp, &path, &compressed)?;
        tracing::debug!(%kind, %hash, size = bytes.len(), "stored object");

        Ok(hash)
    }

    /// load the bytes stored under `hash`
    pub fn get(&self, kind: ObjectKind, hash: &Hash) -> Result<Vec<u8>> {
        let path = self.object_path(kind, hash);

        let compressed = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ObjectNotFound(*hash)
            } else {
                Error::Io {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        let bytes = zstd::decode_all(&compressed[..]).map_err(|_| {
            tracing::error!(%kind, %hash, "object is not a valid zstd frame");
            Error::CorruptObject(*hash)
        })?;

        if Hash::of(&bytes) != *hash {
            tracing::error!(%kind, %hash, "object content does not match its key");
            return Err(Error::CorruptObject(*hash));
        }

        Ok(bytes)
    }

    /// check if an object exists
    pub fn contains(&self, kind: ObjectKind, hash: &Hash) -> bool {
        self.object_path(kind, hash).exists()
    }

    /// list every stored object of one kind
    pub fn list(&self, kind: ObjectKind) -> Result<Vec<Hash>> {
        let dir = self.root.join(kind.dir_name());
        let mut hashes = Vec::new();

        if !dir.exists() {
            return Ok(hashes);
        }

        for entry in WalkDir::new(&dir).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|e| Error::Io {
                path: dir.clone(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walkdir error")),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let parent_name = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or("");

            if let Ok(hash) = Hash::from_hex(&format!("{}{}", parent_name, file_name)) {
                hashes.push(hash);
            }
        }

        hashes.sort();
        Ok(hashes)
    }

    /// resolve an abbreviated id to the single object it names
    ///
    /// returns None when nothing matches or the prefix is ambiguous.
    pub fn resolve_prefix(&self, kind: ObjectKind, prefix: &str) -> Result<Option<Hash>> {
        if !is_hex_prefix(prefix) {
            return Ok(None);
        }
        let prefix = prefix.to_ascii_lowercase();

        if prefix.len() == HEX_LEN {
            let hash = Hash::from_hex(&prefix)?;
            return Ok(self.contains(kind, &hash).then_some(hash));
        }

        let candidates: Vec<Hash> = if prefix.len() >= 2 {
            let fan_dir = self.root.join(kind.dir_name()).join(&prefix[..2]);
            let rest = &prefix[2..];
            let mut found = Vec::new();
            if fan_dir.is_dir() {
                for entry in fs::read_dir(&fan_dir).with_path(&fan_dir)? {
                    let entry = entry.with_path(&fan_dir)?;
                    let name = entry.file_name().to_string_lossy().to_string();
                    if name.starts_with(rest) {
                        if let Ok(hash) = Hash::from_hex(&format!("{}{}", &prefix[..2], name)) {
                            found.push(hash);
                        }
                    }
                }
            }
            found
        } else {
            self.list(kind)?
                .into_iter()
                .filter(|h| h.to_hex().starts_with(&prefix))
                .collect()
        };

        match candidates.as_slice() {
            [only] => Ok(Some(*only)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir(&tmp).unwrap();
        let store = ObjectStore::new(dir.path().join("objects"), tmp, 3);
        (dir, store)
    }

    #[test]
    fn test_put_and_get() {
        let (_dir, store) = test_store();

        let hash = store.put(ObjectKind::Blob, b"hello world").unwrap();
        assert!(store.contains(ObjectKind::Blob, &hash));
        assert!(!store.contains(ObjectKind::Commit, &hash));
        assert_eq!(store.get(ObjectKind::Blob, &hash).unwrap(), b"hello world");
    }

    #[test]
    fn test_put_empty_content() {
        let (_dir, store) = test_store();

        let hash = store.put(ObjectKind::Blob, b"").unwrap();
        assert!(store.get(ObjectKind::Blob, &hash).unwrap().is_empty());
    }

    #[test]
    fn test_put_is_idempotent() {
        let (_dir, store) = test_store();

        let h1 = store.put(ObjectKind::Blob, b"same").unwrap();
        let h2 = store.put(ObjectKind::Blob, b"same").unwrap();

        assert_eq!(h1, h2);
        assert_eq!(store.list(ObjectKind::Blob).unwrap(), vec![h1]);
    }

    #[test]
    fn test_object_path_structure() {
        let (_dir, store) = test_store();

        let hash = store.put(ObjectKind::Commit, b"x").unwrap();
        let path = store.object_path(ObjectKind::Commit, &hash);
        let hex = hash.to_hex();

        assert!(path.ends_with(format!("commits/{}/{}", &hex[..2], &hex[2..])));
        assert!(path.is_file());
    }

    #[test]
    fn test_get_missing() {
        let (_dir, store) = test_store();

        let result = store.get(ObjectKind::Blob, &Hash::of(b"never stored"));
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_get_detects_corruption() {
        let (_dir, store) = test_store();

        let hash = store.put(ObjectKind::Blob, b"original").unwrap();
        let path = store.object_path(ObjectKind::Blob, &hash);
        fs::write(&path, zstd::encode_all(&b"tampered"[..], 3).unwrap()).unwrap();

        let result = store.get(ObjectKind::Blob, &hash);
        assert!(matches!(result, Err(Error::CorruptObject(h)) if h == hash));
    }

    #[test]
    fn test_get_detects_garbage() {
        let (_dir, store) = test_store();

        let hash = store.put(ObjectKind::Blob, b"original").unwrap();
        fs::write(store.object_path(ObjectKind::Blob, &hash), b"not zstd").unwrap();

        assert!(matches!(
            store.get(ObjectKind::Blob, &hash),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn test_resolve_prefix() {
        let (_dir, store) = test_store();

        let hash = store.put(ObjectKind::Commit, b"commit bytes").unwrap();
        let hex = hash.to_hex();

        assert_eq!(store.resolve_prefix(ObjectKind::Commit, &hex).unwrap(), Some(hash));
        assert_eq!(store.resolve_prefix(ObjectKind::Commit, &hex[..6]).unwrap(), Some(hash));
        assert_eq!(store.resolve_prefix(ObjectKind::Commit, &hex[..1]).unwrap(), Some(hash));
        assert_eq!(
            store
                .resolve_prefix(ObjectKind::Commit, &hex[..8].to_uppercase())
                .unwrap(),
            Some(hash)
        );

        // wrong kind, bad input
        assert_eq!(store.resolve_prefix(ObjectKind::Blob, &hex[..6]).unwrap(), None);
        assert_eq!(store.resolve_prefix(ObjectKind::Commit, "").unwrap(), None);
        assert_eq!(store.resolve_prefix(ObjectKind::Commit, "zz").unwrap(), None);
    }

    #[test]
    fn test_resolve_prefix_ambiguous() {
        let (_dir, store) = test_store();

        // 17 objects guarantee two share a leading hex digit
        let hashes: Vec<Hash> = (0..17)
            .map(|i| store.put(ObjectKind::Commit, format!("c{}", i).as_bytes()).unwrap())
            .collect();

        let shared = hashes
            .iter()
            .map(|h| h.to_hex()[..1].to_string())
            .find(|c| hashes.iter().filter(|h| h.to_hex().starts_with(c.as_str())).count() > 1)
            .unwrap();

        assert_eq!(store.resolve_prefix(ObjectKind::Commit, &shared).unwrap(), None);
    }
}
