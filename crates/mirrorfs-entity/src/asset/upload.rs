//! Incoming upload records fed into the mirror upsert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One incoming record for the mirror upsert, keyed by the remote flat key.
///
/// Fields left `None` never clobber previously known values; the merge keeps
/// whichever side is non-null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetUpload {
    /// Flat key of the object.
    pub remote_key: String,
    /// Size in bytes, if known.
    pub size_bytes: Option<i64>,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Pixel width for images, if known.
    pub width: Option<i32>,
    /// Pixel height for images, if known.
    pub height: Option<i32>,
    /// When the remote store reported the object uploaded.
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl AssetUpload {
    /// A record carrying only a key, as produced by listing-only syncs.
    pub fn key_only(remote_key: impl Into<String>) -> Self {
        Self {
            remote_key: remote_key.into(),
            size_bytes: None,
            mime_type: None,
            width: None,
            height: None,
            uploaded_at: None,
        }
    }

    /// Whether the record supplies any metadata beyond the key itself.
    pub fn has_metadata(&self) -> bool {
        self.size_bytes.is_some()
            || self.mime_type.is_some()
            || self.width.is_some()
            || self.height.is_some()
    }
}

/// Outcome of a batch upsert.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UpsertOutcome {
    /// Rows inserted or updated.
    pub upserted: usize,
    /// Rows skipped because they carried no metadata.
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_metadata() {
        assert!(!AssetUpload::key_only("a/b.jpg").has_metadata());

        let mut upload = AssetUpload::key_only("a/b.jpg");
        upload.mime_type = Some("image/jpeg".to_string());
        assert!(upload.has_metadata());

        let mut upload = AssetUpload::key_only("a/b.jpg");
        upload.uploaded_at = Some(Utc::now());
        // A timestamp alone is not metadata worth a row.
        assert!(!upload.has_metadata());
    }
}
