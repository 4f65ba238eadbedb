use crate::error::Result;
use crate::hash::Hash;
use crate::object::{ObjectKind, ObjectStore};

/// hash file content the way `write_blob` keys it
pub fn compute_blob_hash(content: &[u8]) -> Hash {
    Hash::of(content)
}

/// write a blob to the object store
pub fn write_blob(store: &ObjectStore, content: &[u8]) -> Result<Hash> {
    store.put(ObjectKind::Blob, content)
}

/// read blob content
pub fn read_blob(store: &ObjectStore, hash: &Hash) -> Result<Vec<u8>> {
    store.get(ObjectKind::Blob, hash)
}

/// check if a blob exists in the object store
pub fn blob_exists(store: &ObjectStore, hash: &Hash) -> bool {
    store.contains(ObjectKind::Blob, hash)
}
