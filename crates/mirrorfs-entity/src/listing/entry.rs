//! Entries returned by filesystem listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a listing entry is a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A folder (real-object prefix, marker row, or bare root).
    Folder,
    /// A real mirrored object.
    File,
}

/// One entry of a filesystem listing.
///
/// Folder entries are synthesized on read; only file entries correspond to
/// mirror rows for real objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsEntry {
    /// Folder or file.
    pub kind: EntryKind,
    /// Display name (last path segment).
    pub name: String,
    /// Full display path (`root/relative/...`).
    pub path: String,
    /// Flat remote key; `None` for synthesized folders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
    /// Size in bytes for files; aggregated subtree bytes for folders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    /// MIME type, if known (backfilled by extension when missing).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Pixel width for images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// Pixel height for images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// When the remote store reported the object uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Number of direct real descendants, for folder entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

impl FsEntry {
    /// Construct a synthesized folder entry.
    pub fn folder(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Folder,
            name: name.into(),
            path: path.into(),
            remote_key: None,
            size_bytes: None,
            mime_type: None,
            width: None,
            height: None,
            uploaded_at: None,
            child_count: None,
        }
    }
}
