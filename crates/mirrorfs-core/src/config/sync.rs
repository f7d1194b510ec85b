//! Reconciliation and bulk-delete settings.

use serde::{Deserialize, Serialize};

/// Settings for mirror reconciliation and destructive batch operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Number of remote deletes dispatched together in one window.
    #[serde(default = "default_delete_window")]
    pub delete_window: usize,
    /// Whether filesystem reads opportunistically sync from the remote store.
    #[serde(default = "default_true")]
    pub sync_on_read: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            delete_window: default_delete_window(),
            sync_on_read: default_true(),
        }
    }
}

fn default_delete_window() -> usize {
    5
}

fn default_true() -> bool {
    true
}
