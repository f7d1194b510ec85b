//! Delete orchestration across the remote store and the mirror.
//!
//! The remote store is authoritative for real objects, so it is mutated
//! first; the mirror is then reconciled to the subset that actually
//! succeeded. A crash mid-batch leaves the mirror consistent with what is
//! still really there.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use mirrorfs_core::error::{AppError, ErrorKind};
use mirrorfs_core::path;
use mirrorfs_core::result::AppResult;
use mirrorfs_core::traits::remote::RemoteStore;
use mirrorfs_database::repositories::{
    AssetRepository, RootDeleteOutcome, RootRepository, VirtualFolderRepository,
};

use super::batch::{delete_in_windows, BatchFailure};

/// How many matched keys a dry run reports back as a sample.
const DRY_RUN_SAMPLE: usize = 10;

/// Outcome of a single-file delete. Absent rows are a successful no-op with
/// zero counts, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct FileDeleteOutcome {
    /// The key that was addressed.
    pub key: String,
    /// Remote objects actually removed (0 or 1).
    pub remote_removed: usize,
    /// Mirror rows actually removed (0 or 1).
    pub mirror_removed: usize,
}

/// Outcome of a folder-cascade delete.
#[derive(Debug, Clone, Serialize)]
pub struct FolderDeleteOutcome {
    /// False when any per-item delete failed.
    pub ok: bool,
    /// Whether this was a dry run (nothing deleted).
    pub dry_run: bool,
    /// Keys matched by the resolution step.
    pub matched: usize,
    /// Sample of matched keys (dry run only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample: Vec<String>,
    /// Remote objects actually removed.
    pub remote_removed: usize,
    /// Mirror rows removed (only keys that succeeded remotely).
    pub mirror_removed: u64,
    /// Virtual markers removed with the subtree.
    pub markers_removed: u64,
    /// Per-item failures; these keys stay in the mirror for retry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<BatchFailure>,
}

/// Orchestrates file, folder-cascade, and guarded root deletes.
#[derive(Debug, Clone)]
pub struct DeleteService {
    pool: PgPool,
    roots: RootRepository,
    assets: AssetRepository,
    remote: Arc<dyn RemoteStore>,
    delete_window: usize,
    list_max: usize,
}

impl DeleteService {
    /// Create a new delete service.
    pub fn new(
        pool: PgPool,
        roots: RootRepository,
        assets: AssetRepository,
        remote: Arc<dyn RemoteStore>,
        delete_window: usize,
        list_max: usize,
    ) -> Self {
        Self {
            pool,
            roots,
            assets,
            remote,
            delete_window,
            list_max,
        }
    }

    /// Delete a single object by key: remote first (not-found is success),
    /// then the mirror row.
    pub async fn delete_file(&self, key: &str) -> AppResult<FileDeleteOutcome> {
        if key.trim().is_empty() {
            return Err(AppError::validation("Key must not be empty"));
        }
        if path::is_marker_key(key) {
            return Err(AppError::validation(
                "Marker keys are managed through virtual-folder deletion",
            ));
        }

        let existed_remote = self.remote.delete_by_key(key).await?;
        let removed_mirror = self.assets.delete_by_key(key).await?;

        info!(
            key,
            existed_remote, removed_mirror, "File delete completed"
        );

        let outcome = FileDeleteOutcome {
            key: key.to_string(),
            remote_removed: usize::from(existed_remote),
            mirror_removed: usize::from(removed_mirror),
        };

        if let Ok(parsed) = path::split_display_path(key) {
            self.cleanup_root(&parsed.root).await;
        }

        Ok(outcome)
    }

    /// Delete every real object in a folder subtree.
    ///
    /// Targets come from the mirror; when the mirror has no matching rows
    /// the full remote listing is filtered by prefix instead (tolerating the
    /// historical duplicated-segment keys). Remote deletes run in bounded
    /// windows; the mirror then drops only the keys that succeeded remotely.
    pub async fn delete_folder(&self, folder_path: &str, dry_run: bool) -> AppResult<FolderDeleteOutcome> {
        let folder = path::split_folder_path(folder_path)?;

        let mut keys = self
            .assets
            .real_keys_under(&folder.root, &folder.relative_prefix)
            .await?;

        if keys.is_empty() {
            debug!(
                folder_path,
                "No mirror rows matched; falling back to remote listing"
            );
            let objects = self.remote.list_all(None, self.list_max).await?;
            keys = filter_remote_keys(
                objects.into_iter().map(|o| o.key),
                &folder.root,
                &folder.relative_prefix,
            );
        }

        if dry_run {
            return Ok(FolderDeleteOutcome {
                ok: true,
                dry_run: true,
                matched: keys.len(),
                sample: keys.into_iter().take(DRY_RUN_SAMPLE).collect(),
                remote_removed: 0,
                mirror_removed: 0,
                markers_removed: 0,
                failed: Vec::new(),
            });
        }

        let batch = delete_in_windows(&keys, self.delete_window, |key| {
            let remote = Arc::clone(&self.remote);
            async move { remote.delete_by_key(&key).await }
        })
        .await;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mirror_removed = AssetRepository::delete_by_keys_with(&mut tx, &batch.succeeded).await?;
        let markers_removed = if batch.failed.is_empty() && !folder.relative_prefix.is_empty() {
            VirtualFolderRepository::delete_subtree_with(
                &mut tx,
                &folder.root,
                &folder.relative_prefix,
            )
            .await?
        } else {
            0
        };

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        let ok = batch.failed.is_empty();
        if ok {
            info!(
                folder_path,
                matched = keys.len(),
                remote_removed = batch.removed_remote,
                mirror_removed,
                "Folder delete completed"
            );
            self.cleanup_root(&folder.root).await;
        } else {
            warn!(
                folder_path,
                failed = batch.failed.len(),
                "Folder delete completed partially; failed keys stay mirrored"
            );
        }

        Ok(FolderDeleteOutcome {
            ok,
            dry_run: false,
            matched: keys.len(),
            sample: Vec::new(),
            remote_removed: batch.removed_remote,
            mirror_removed,
            markers_removed,
            failed: batch.failed,
        })
    }

    /// Delete a root, refusing while any real asset remains under it.
    pub async fn delete_root(&self, root: &str) -> AppResult<RootDeleteOutcome> {
        if root.trim().is_empty() {
            return Err(AppError::validation("Root must not be empty"));
        }
        let outcome = self.roots.delete_guarded(root).await?;
        info!(
            root,
            markers_removed = outcome.markers_removed,
            root_removed = outcome.root_removed,
            "Root deleted"
        );
        Ok(outcome)
    }

    /// Best-effort removal of a root that may have been emptied.
    async fn cleanup_root(&self, slug: &str) {
        match self.roots.cleanup_if_empty(slug).await {
            Ok(removed) => {
                if removed {
                    debug!(slug, "Removed emptied root");
                }
            }
            Err(err) => debug!(slug, %err, "Root cleanup skipped"),
        }
    }
}

/// Filter a full remote key listing down to a folder subtree, tolerating the
/// historical duplicated-first-segment keys (`root/root/...`) on read.
pub(crate) fn filter_remote_keys(
    keys: impl Iterator<Item = String>,
    root: &str,
    prefix: &str,
) -> Vec<String> {
    let canonical = path::display_key(root, prefix);
    let duplicated = path::join_path(root, &canonical);

    keys.filter(|key| {
        !path::is_marker_key(key)
            && (key_in_subtree(key, &canonical) || key_in_subtree(key, &duplicated))
    })
    .collect()
}

/// Whether `key` equals `prefix` or lives below it. An empty prefix matches
/// every key.
fn key_in_subtree(key: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    key == prefix || key.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(keys: &[&str], root: &str, prefix: &str) -> Vec<String> {
        filter_remote_keys(keys.iter().map(|k| k.to_string()), root, prefix)
    }

    #[test]
    fn test_filter_matches_subtree() {
        let keys = ["r/a/1.jpg", "r/a/b/2.jpg", "r/ab/3.jpg", "s/a/4.jpg"];
        assert_eq!(filter(&keys, "r", "a"), vec!["r/a/1.jpg", "r/a/b/2.jpg"]);
    }

    #[test]
    fn test_filter_tolerates_duplicated_root_segment() {
        let keys = ["r/r/a/1.jpg", "r/a/2.jpg"];
        assert_eq!(filter(&keys, "r", "a"), vec!["r/r/a/1.jpg", "r/a/2.jpg"]);
    }

    #[test]
    fn test_filter_empty_prefix_matches_whole_root() {
        let keys = ["r/a/1.jpg", "r/2.jpg", "s/3.jpg", "r"];
        assert_eq!(filter(&keys, "r", ""), vec!["r/a/1.jpg", "r/2.jpg", "r"]);
    }

    #[test]
    fn test_filter_skips_marker_namespace() {
        let keys = ["__folder__/r/a", "r/a/1.jpg"];
        assert_eq!(filter(&keys, "r", "a"), vec!["r/a/1.jpg"]);
    }

    #[test]
    fn test_filter_default_root_has_bare_keys() {
        let keys = ["1.jpg", "a/2.jpg", "root/3.jpg"];
        // Under the default root with no prefix, everything matches.
        assert_eq!(filter(&keys, "root", "").len(), 3);
    }
}
