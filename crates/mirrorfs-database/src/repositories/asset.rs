//! Asset repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use mirrorfs_core::error::{AppError, ErrorKind};
use mirrorfs_core::path;
use mirrorfs_core::result::AppResult;
use mirrorfs_entity::asset::{Asset, AssetRename, AssetUpload, UpsertOutcome};

use super::like_prefix;
use super::root::RootRepository;
use super::virtual_folder::VirtualFolderRepository;

/// Repository for asset rows (real objects and virtual-folder markers).
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    /// Create a new asset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an asset by its remote key.
    pub async fn find_by_key(&self, key: &str) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE remote_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    /// Find an asset by key inside a transaction, locking the row.
    pub async fn find_by_key_for_update_with(
        conn: &mut PgConnection,
        key: &str,
    ) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE remote_key = $1 FOR UPDATE")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    /// Upsert a batch of incoming upload records in one transaction.
    ///
    /// Each record is resolved to root/relative/file via the path rules and
    /// merged over any existing row with the same key; `None` fields never
    /// clobber previously known values and the row always ends up
    /// `uploaded`. With `skip_if_no_metadata`, records carrying no
    /// size/mime/dimensions are skipped entirely so listing-only syncs do
    /// not erase richer data. Keys in the marker namespace are never
    /// mirrored as real objects.
    pub async fn upsert_batch(
        &self,
        uploads: &[AssetUpload],
        skip_if_no_metadata: bool,
        actor: &str,
    ) -> AppResult<UpsertOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut outcome = UpsertOutcome::default();
        for upload in uploads {
            if path::is_marker_key(&upload.remote_key) {
                outcome.skipped += 1;
                continue;
            }
            if skip_if_no_metadata && !upload.has_metadata() {
                outcome.skipped += 1;
                continue;
            }

            let parsed = path::split_display_path(&upload.remote_key)?;
            RootRepository::ensure_with(&mut *tx, &parsed.root, actor).await?;

            sqlx::query(
                "INSERT INTO assets \
                 (remote_key, root_slug, relative_path, file_name, size_bytes, mime_type, \
                  width, height, upload_status, remote_uploaded_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'uploaded', $9) \
                 ON CONFLICT (remote_key) DO UPDATE SET \
                   root_slug = EXCLUDED.root_slug, \
                   relative_path = EXCLUDED.relative_path, \
                   file_name = EXCLUDED.file_name, \
                   size_bytes = COALESCE(EXCLUDED.size_bytes, assets.size_bytes), \
                   mime_type = COALESCE(EXCLUDED.mime_type, assets.mime_type), \
                   width = COALESCE(EXCLUDED.width, assets.width), \
                   height = COALESCE(EXCLUDED.height, assets.height), \
                   remote_uploaded_at = COALESCE(EXCLUDED.remote_uploaded_at, assets.remote_uploaded_at), \
                   upload_status = 'uploaded'",
            )
            .bind(&upload.remote_key)
            .bind(&parsed.root)
            .bind(&parsed.relative_path)
            .bind(&parsed.file_name)
            .bind(upload.size_bytes)
            .bind(&upload.mime_type)
            .bind(upload.width)
            .bind(upload.height)
            .bind(upload.uploaded_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to upsert asset", e)
            })?;

            // A real object at this path makes its ancestor markers redundant.
            VirtualFolderRepository::cleanup_for_path_with(
                &mut *tx,
                &parsed.root,
                &parsed.relative_path,
            )
            .await?;

            outcome.upserted += 1;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(outcome)
    }

    /// Select every row (real or virtual) in a folder subtree, locking the
    /// rows for the rest of the transaction. An empty prefix selects the
    /// whole root.
    pub async fn select_subtree_for_update_with(
        conn: &mut PgConnection,
        root: &str,
        prefix: &str,
    ) -> AppResult<Vec<Asset>> {
        let query = if prefix.is_empty() {
            sqlx::query_as::<_, Asset>(
                "SELECT * FROM assets WHERE root_slug = $1 ORDER BY relative_path ASC FOR UPDATE",
            )
            .bind(root)
        } else {
            sqlx::query_as::<_, Asset>(
                "SELECT * FROM assets WHERE root_slug = $1 \
                 AND (relative_path = $2 OR relative_path LIKE $3) \
                 ORDER BY relative_path ASC FOR UPDATE",
            )
            .bind(root)
            .bind(prefix)
            .bind(like_prefix(prefix))
        };

        query.fetch_all(&mut *conn).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to select folder subtree", e)
        })
    }

    /// Of `keys`, return those already owned by rows outside `exclude_ids`.
    pub async fn keys_taken_with(
        conn: &mut PgConnection,
        keys: &[String],
        exclude_ids: &[Uuid],
    ) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT remote_key FROM assets \
             WHERE remote_key = ANY($1) AND NOT (id = ANY($2)) \
             ORDER BY remote_key ASC",
        )
        .bind(keys)
        .bind(exclude_ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check key collisions", e))
    }

    /// Apply a staged set of identity changes, one row each.
    pub async fn apply_renames_with(
        conn: &mut PgConnection,
        renames: &[AssetRename],
    ) -> AppResult<u64> {
        let mut updated = 0u64;
        for rename in renames {
            let result = sqlx::query(
                "UPDATE assets SET remote_key = $2, root_slug = $3, relative_path = $4, \
                 file_name = $5 WHERE id = $1",
            )
            .bind(rename.asset_id)
            .bind(&rename.remote_key)
            .bind(&rename.root_slug)
            .bind(&rename.relative_path)
            .bind(&rename.file_name)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to apply rename", e)
            })?;
            updated += result.rows_affected();
        }
        Ok(updated)
    }

    /// Keys of every *real* object in a folder subtree. An empty prefix
    /// matches the whole root.
    pub async fn real_keys_under(&self, root: &str, prefix: &str) -> AppResult<Vec<String>> {
        let query = if prefix.is_empty() {
            sqlx::query_scalar::<_, String>(
                "SELECT remote_key FROM assets WHERE root_slug = $1 \
                 AND upload_status = 'uploaded' ORDER BY remote_key ASC",
            )
            .bind(root)
        } else {
            sqlx::query_scalar::<_, String>(
                "SELECT remote_key FROM assets WHERE root_slug = $1 \
                 AND upload_status = 'uploaded' \
                 AND (relative_path = $2 OR relative_path LIKE $3) \
                 ORDER BY remote_key ASC",
            )
            .bind(root)
            .bind(prefix)
            .bind(like_prefix(prefix))
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subtree keys", e))
    }

    /// All *real* rows for a root, optionally filtered to a folder subtree,
    /// ordered by path.
    pub async fn list_real(&self, root: &str, prefix: Option<&str>) -> AppResult<Vec<Asset>> {
        let query = match prefix {
            None | Some("") => sqlx::query_as::<_, Asset>(
                "SELECT * FROM assets WHERE root_slug = $1 AND upload_status = 'uploaded' \
                 ORDER BY relative_path ASC",
            )
            .bind(root),
            Some(prefix) => sqlx::query_as::<_, Asset>(
                "SELECT * FROM assets WHERE root_slug = $1 AND upload_status = 'uploaded' \
                 AND (relative_path = $2 OR relative_path LIKE $3) \
                 ORDER BY relative_path ASC",
            )
            .bind(root)
            .bind(prefix.to_string())
            .bind(like_prefix(prefix)),
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list assets", e))
    }

    /// Delete rows by key inside a transaction; returns rows removed.
    pub async fn delete_by_keys_with(conn: &mut PgConnection, keys: &[String]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM assets WHERE remote_key = ANY($1)")
            .bind(keys)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete assets", e))?;
        Ok(result.rows_affected())
    }

    /// Delete one row by key; returns whether a row was removed.
    pub async fn delete_by_key(&self, key: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE remote_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete asset", e))?;
        Ok(result.rows_affected() > 0)
    }

    // -- Statistics --

    /// Count all rows, markers included.
    pub async fn count_all(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count assets", e))
    }

    /// Count real object rows.
    pub async fn count_real(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assets WHERE upload_status = 'uploaded'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count real assets", e))
    }

    /// Count virtual-folder marker rows.
    pub async fn count_markers(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assets WHERE upload_status = 'virtual-folder'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count markers", e))
    }

    /// Total size of all mirrored objects in bytes.
    pub async fn total_size_bytes(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(size_bytes), 0) FROM assets")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to calculate mirror size", e)
            })
    }
}
