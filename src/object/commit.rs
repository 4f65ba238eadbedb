use crate::error::Result;
use crate::hash::Hash;
use crate::object::{ObjectKind, ObjectStore};
use crate::types::Commit;

/// serialize a commit record to CBOR
pub fn encode_commit(commit: &Commit) -> Result<Vec<u8>> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(commit, &mut cbor_bytes)?;
    Ok(cbor_bytes)
}

/// hash a commit without storing it
pub fn compute_commit_hash(commit: &Commit) -> Result<Hash> {
    Ok(Hash::of(&encode_commit(commit)?))
}

/// write a commit to the object store
///
/// the hash covers the CBOR encoding of every field, so changing the
/// message, timestamp, parents or tracked files yields a different commit.
pub fn write_commit(store: &ObjectStore, commit: &Commit) -> Result<Hash> {
    let bytes = encode_commit(commit)?;
    store.put(ObjectKind::Commit, &bytes)
}

/// read a commit from the object store
pub fn read_commit(store: &ObjectStore, hash: &Hash) -> Result<Commit> {
    let bytes = store.get(ObjectKind::Commit, hash)?;
    let commit: Commit = ciborium::from_reader(&bytes[..])?;
    Ok(commit)
}
