mod commit;
mod index;

pub use commit::{Commit, INITIAL_COMMIT_MESSAGE};
pub use index::StagingArea;
