//! Rename engine: files, folders, and roots.

mod plan;
mod service;

pub use plan::{plan_folder_renames, RenamePlan};
pub use service::{FileRenameOutcome, FolderRenameOutcome, RenameService};
