//! Virtual-folder bookkeeping.

mod service;

pub use service::{FolderService, VirtualFolderCreated, VirtualFolderDeleted};
