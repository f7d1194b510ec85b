//! Asset entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UploadStatus;

/// A mirror row: either a real object mirrored from the remote store, or a
/// virtual-folder marker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Surrogate identifier.
    pub id: Uuid,
    /// The flat key used by the remote store; globally unique.
    pub remote_key: String,
    /// Slug of the root this asset belongs to.
    pub root_slug: String,
    /// Path within the root, including the file name. Unique per root for
    /// real objects (enforced at the application layer).
    pub relative_path: String,
    /// Last path segment, denormalized for query convenience.
    pub file_name: String,
    /// Size in bytes, if known.
    pub size_bytes: Option<i64>,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Pixel width for images, if known.
    pub width: Option<i32>,
    /// Pixel height for images, if known.
    pub height: Option<i32>,
    /// Real object or virtual-folder marker.
    pub upload_status: UploadStatus,
    /// When the remote store reported the object uploaded.
    pub remote_uploaded_at: Option<DateTime<Utc>>,
    /// When the mirror row was created.
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Whether this row is a virtual-folder marker.
    pub fn is_virtual(&self) -> bool {
        self.upload_status.is_virtual()
    }

    /// The file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.file_name)
            .map(|ext| ext.to_lowercase())
    }
}

/// A staged identity change for one asset row, produced by rename planning
/// and applied in bulk inside a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRename {
    /// Row to update.
    pub asset_id: Uuid,
    /// New flat key.
    pub remote_key: String,
    /// New root slug.
    pub root_slug: String,
    /// New path within the root.
    pub relative_path: String,
    /// New last segment.
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            remote_key: name.to_string(),
            root_slug: "root".to_string(),
            relative_path: name.to_string(),
            file_name: name.to_string(),
            size_bytes: None,
            mime_type: None,
            width: None,
            height: None,
            upload_status: UploadStatus::Uploaded,
            remote_uploaded_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(asset("beach.JPG").extension(), Some("jpg".to_string()));
        assert_eq!(asset("archive.tar.gz").extension(), Some("gz".to_string()));
        assert_eq!(asset("Makefile").extension(), None);
    }
}
