//! Rename orchestration over the mirror.
//!
//! Renames never touch the remote store: the mirror's keys are recomputed
//! and bulk-applied, and reconciliation keeps the stores aligned.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};

use mirrorfs_core::error::{AppError, ErrorKind};
use mirrorfs_core::path;
use mirrorfs_core::result::AppResult;
use mirrorfs_database::repositories::{AssetRepository, RootRepository, VirtualFolderRepository};
use mirrorfs_entity::asset::AssetRename;

use crate::context::RequestContext;

use super::plan::plan_folder_renames;

/// Outcome of a file rename.
#[derive(Debug, Clone, Serialize)]
pub struct FileRenameOutcome {
    /// Key the row held before the rename.
    pub old_key: String,
    /// Key the row holds now.
    pub new_key: String,
}

/// Outcome of a folder (or root) rename.
#[derive(Debug, Clone, Serialize)]
pub struct FolderRenameOutcome {
    /// Rows whose identity changed.
    pub renamed: usize,
    /// Whether an empty root was renamed in place instead.
    pub root_renamed: bool,
}

/// Orchestrates file, folder, and root renames with conflict detection.
#[derive(Debug, Clone)]
pub struct RenameService {
    pool: PgPool,
    roots: RootRepository,
}

impl RenameService {
    /// Create a new rename service.
    pub fn new(pool: PgPool, roots: RootRepository) -> Self {
        Self { pool, roots }
    }

    /// Rename a single file from one display path to another.
    ///
    /// Fails 404 when the source row does not exist and 409 when another row
    /// already owns the destination key. The row keeps its identity; only
    /// key/root/path/name change, all inside one transaction.
    pub async fn rename_file(
        &self,
        from: &str,
        to: &str,
        ctx: &RequestContext,
    ) -> AppResult<FileRenameOutcome> {
        let old = path::split_display_path(from)?;
        let new = path::split_display_path(to)?;
        let old_key = path::display_key(&old.root, &old.relative_path);
        let new_key = path::display_key(&new.root, &new.relative_path);

        if old_key == new_key {
            return Ok(FileRenameOutcome { old_key, new_key });
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let source = AssetRepository::find_by_key_for_update_with(&mut tx, &old_key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No object at '{from}'")))?;

        RootRepository::ensure_with(&mut tx, &new.root, &ctx.actor).await?;

        let taken =
            AssetRepository::keys_taken_with(&mut tx, &[new_key.clone()], &[source.id]).await?;
        if !taken.is_empty() {
            return Err(AppError::conflict(format!(
                "Destination key '{new_key}' already exists"
            )));
        }

        AssetRepository::apply_renames_with(
            &mut tx,
            &[AssetRename {
                asset_id: source.id,
                remote_key: new_key.clone(),
                root_slug: new.root.clone(),
                relative_path: new.relative_path.clone(),
                file_name: new.file_name.clone(),
            }],
        )
        .await?;

        // The renamed object materializes at its new path; ancestor markers
        // there are now redundant.
        VirtualFolderRepository::cleanup_for_path_with(&mut tx, &new.root, &new.relative_path)
            .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        info!(%old_key, %new_key, actor = %ctx.actor, "File renamed");

        if old.root != new.root {
            self.cleanup_root(&old.root).await;
        }

        Ok(FileRenameOutcome { old_key, new_key })
    }

    /// Rename a folder (or a whole root) with folder path semantics.
    ///
    /// Selects every row in the old subtree under row locks, grafts each
    /// suffix onto the new prefix, checks the staged keys for collisions
    /// against rows outside the selection, and bulk-applies — all in one
    /// transaction.
    pub async fn rename_folder(
        &self,
        from: &str,
        to: &str,
        ctx: &RequestContext,
    ) -> AppResult<FolderRenameOutcome> {
        let old = path::split_folder_path(from)?;
        let new = path::split_folder_path(to)?;

        if old == new {
            return Ok(FolderRenameOutcome {
                renamed: 0,
                root_renamed: false,
            });
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut rows = AssetRepository::select_subtree_for_update_with(
            &mut tx,
            &old.root,
            &old.relative_prefix,
        )
        .await?;

        if rows.is_empty() {
            if old.relative_prefix.is_empty() {
                // An empty root: rename the root row itself.
                if !RootRepository::exists_with(&mut tx, &old.root).await? {
                    return Err(AppError::not_found(format!("No root named '{}'", old.root)));
                }
                if RootRepository::exists_with(&mut tx, &new.root).await? {
                    return Err(AppError::conflict(format!(
                        "Root '{}' already exists",
                        new.root
                    )));
                }
                RootRepository::rename_slug_with(&mut tx, &old.root, &new.root).await?;
                tx.commit().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
                })?;
                info!(old_root = %old.root, new_root = %new.root, "Empty root renamed");
                return Ok(FolderRenameOutcome {
                    renamed: 0,
                    root_renamed: true,
                });
            }

            // A nested empty folder that never materialized: synthesize its
            // marker on the fly and rename that.
            VirtualFolderRepository::insert_marker_with(&mut tx, &old.root, &old.relative_prefix)
                .await?;
            rows = AssetRepository::select_subtree_for_update_with(
                &mut tx,
                &old.root,
                &old.relative_prefix,
            )
            .await?;
        }

        let plan = plan_folder_renames(&rows, &old, &new)?;

        RootRepository::ensure_with(&mut tx, &new.root, &ctx.actor).await?;

        let taken =
            AssetRepository::keys_taken_with(&mut tx, &plan.staged_keys, &plan.source_ids).await?;
        if let Some(first) = taken.first() {
            return Err(AppError::conflict(format!(
                "Destination key '{first}' already exists"
            )));
        }

        let renamed = AssetRepository::apply_renames_with(&mut tx, &plan.renames).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        info!(
            from,
            to,
            renamed,
            actor = %ctx.actor,
            "Folder renamed"
        );

        if old.root != new.root || old.relative_prefix.is_empty() {
            self.cleanup_root(&old.root).await;
        }

        Ok(FolderRenameOutcome {
            renamed: renamed as usize,
            root_renamed: false,
        })
    }

    /// Best-effort removal of a root that may have been emptied. Failure is
    /// swallowed; this is an optimization, not a correctness requirement.
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
