//! Virtual-folder marker repository implementation.

use sqlx::{PgConnection, PgPool};

use mirrorfs_core::error::{AppError, ErrorKind};
use mirrorfs_core::path;
use mirrorfs_core::result::AppResult;

use super::like_prefix;
use super::root::RootRepository;

/// Repository for the virtual-folder marker rows kept in the assets table.
#[derive(Debug, Clone)]
pub struct VirtualFolderRepository {
    pool: PgPool,
}

impl VirtualFolderRepository {
    /// Create a new virtual-folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one marker per ancestor level (`a`, `a/b`, `a/b/c`, ...) in a
    /// single transaction, ensuring the root exists first. Each marker is
    /// upserted idempotently.
    pub async fn create_markers(
        &self,
        root: &str,
        levels: &[String],
        created_by: &str,
    ) -> AppResult<usize> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        RootRepository::ensure_with(&mut *tx, root, created_by).await?;
        for level in levels {
            Self::insert_marker_with(&mut *tx, root, level).await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(levels.len())
    }

    /// Upsert a single marker row inside a transaction.
    pub async fn insert_marker_with(
        conn: &mut PgConnection,
        root: &str,
        folder_path: &str,
    ) -> AppResult<()> {
        let key = path::folder_marker_key(root, folder_path);
        let name = folder_path.rsplit('/').next().unwrap_or(folder_path);

        sqlx::query(
            "INSERT INTO assets (remote_key, root_slug, relative_path, file_name, upload_status) \
             VALUES ($1, $2, $3, $4, 'virtual-folder') \
             ON CONFLICT (remote_key) DO NOTHING",
        )
        .bind(key)
        .bind(root)
        .bind(folder_path)
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert marker", e))?;
        Ok(())
    }

    /// Marker paths for a root, optionally scoped to a folder subtree,
    /// ordered by path.
    pub async fn marker_paths(&self, root: &str, prefix: Option<&str>) -> AppResult<Vec<String>> {
        let query = match prefix {
            None | Some("") => sqlx::query_scalar::<_, String>(
                "SELECT relative_path FROM assets WHERE root_slug = $1 \
                 AND upload_status = 'virtual-folder' ORDER BY relative_path ASC",
            )
            .bind(root),
            Some(prefix) => sqlx::query_scalar::<_, String>(
                "SELECT relative_path FROM assets WHERE root_slug = $1 \
                 AND upload_status = 'virtual-folder' \
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
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list markers", e))
    }

    /// Delete every marker in a folder subtree. Never touches real assets.
    pub async fn delete_subtree(&self, root: &str, prefix: &str) -> AppResult<u64> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::delete_subtree_with(&mut conn, root, prefix).await
    }

    /// Transaction-scoped variant of [`delete_subtree`](Self::delete_subtree).
    pub async fn delete_subtree_with(
        conn: &mut PgConnection,
        root: &str,
        prefix: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM assets WHERE root_slug = $1 AND upload_status = 'virtual-folder' \
             AND (relative_path = $2 OR relative_path LIKE $3)",
        )
        .bind(root)
        .bind(prefix)
        .bind(like_prefix(prefix))
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete markers", e))?;
        Ok(result.rows_affected())
    }

    /// Remove the markers made redundant by a real object at
    /// `relative_path`: one delete per ancestor level, idempotent.
    pub async fn cleanup_for_path_with(
        conn: &mut PgConnection,
        root: &str,
        relative_path: &str,
    ) -> AppResult<u64> {
        let ancestors = path::ancestor_prefixes(relative_path);
        if ancestors.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "DELETE FROM assets WHERE root_slug = $1 AND upload_status = 'virtual-folder' \
             AND relative_path = ANY($2)",
        )
        .bind(root)
        .bind(&ancestors)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clean up markers", e))?;
        Ok(result.rows_affected())
    }

    /// Pool-scoped marker cleanup for a freshly materialized remote key.
    pub async fn cleanup_for_key(&self, remote_key: &str) -> AppResult<u64> {
        let parsed = path::split_display_path(remote_key)?;
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::cleanup_for_path_with(&mut conn, &parsed.root, &parsed.relative_path).await
    }
}
