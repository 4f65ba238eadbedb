//! filesystem helpers shared by the object store and metadata writers

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{IoResultExt, Result};

/// write `bytes` to `dest` atomically
///
/// the data goes to a uniquely named file under `tmp_dir` first, is fsynced,
/// then renamed over `dest`. the parent directory is fsynced afterwards so the
/// rename itself is durable. readers see either the old file or the new one.
pub fn atomic_write(tmp_dir: &Path, dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let tmp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(bytes).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }

    if let Err(e) = fs::rename(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_path(dest);
    }

    if let Some(parent) = dest.parent() {
        fsync_dir(parent)?;
    }

    Ok(())
}

/// fsync a directory
pub fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_and_replaces() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir(&tmp).unwrap();
        let dest = dir.path().join("nested/file");

        atomic_write(&tmp, &dest, b"one").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"one");

        atomic_write(&tmp, &dest, b"two").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"two");

        // no temp files left behind
        assert_eq!(fs::read_dir(&tmp).unwrap().count(), 0);
    }
}
