//! Filesystem listing entries.

mod entry;

pub use entry::{EntryKind, FsEntry};
