//! Upload status enumeration.

use serde::{Deserialize, Serialize};

/// Distinguishes real mirrored objects from virtual-folder marker rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "upload_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UploadStatus {
    /// A real object that exists in the remote store.
    Uploaded,
    /// A marker row remembering an otherwise-empty folder; no remote object.
    VirtualFolder,
}

impl UploadStatus {
    /// Return the status as its stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::VirtualFolder => "virtual-folder",
        }
    }

    /// Whether this row is a virtual-folder marker.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::VirtualFolder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&UploadStatus::VirtualFolder).unwrap(),
            "\"virtual-folder\""
        );
        assert_eq!(
            serde_json::to_string(&UploadStatus::Uploaded).unwrap(),
            "\"uploaded\""
        );
    }
}
