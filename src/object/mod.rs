pub mod blob;
pub mod commit;
pub mod store;

pub use blob::{blob_exists, compute_blob_hash, read_blob, write_blob};
pub use commit::{compute_commit_hash, read_commit, write_commit};
pub use store::{ObjectKind, ObjectStore};
