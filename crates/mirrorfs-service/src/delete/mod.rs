//! Delete engine: files, folder cascades, and guarded roots.

mod batch;
mod service;

pub use batch::{delete_in_windows, BatchFailure, BatchOutcome};
pub use service::{DeleteService, FileDeleteOutcome, FolderDeleteOutcome};
