//! staging area persistence

use std::fs;

use crate::error::{Error, Result};
use crate::repo::Repo;
use crate::types::StagingArea;

/// load the staging area; a missing index file is an empty staging area
pub fn read_index(repo: &Repo) -> Result<StagingArea> {
    let path = repo.index_path();

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StagingArea::new()),
        Err(source) => return Err(Error::Io { path, source }),
    };

    let index: StagingArea = ciborium::from_reader(&bytes[..])?;
    Ok(index)
}

/// persist the staging area atomically
pub fn write_index(repo: &Repo, index: &StagingArea) -> Result<()> {
    let mut bytes = Vec::new();
    ciborium::into_writer(index, &mut bytes)?;
    repo.write_atomic(&repo.index_path(), &bytes)
}
