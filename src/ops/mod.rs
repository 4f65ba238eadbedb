//! high-level operations on sprig repositories
//!
//! every mutating operation takes the repository lock, loads HEAD, branches
//! and the staging area from disk, and persists them before returning.

mod add;
mod branch;
mod checkout;
mod commit;
mod log;
mod merge;
mod rm;
mod status;

pub use add::stage_add;
pub use branch::{create_branch, list_branches, remove_branch};
pub use checkout::{checkout_file, checkout_file_from_commit, reset, switch_branch};
pub use commit::{commit, commit_at};
pub use log::{find, global_log, log, LogEntry};
pub use merge::{classify, conflict_content, merge, merge_at, MergeAction, MergeOutcome};
pub use rm::stage_remove;
pub use status::{status, Modification, Status};
