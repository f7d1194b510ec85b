//! Root repository implementation.

use sqlx::{PgConnection, PgPool};

use mirrorfs_core::error::{AppError, ErrorKind};
use mirrorfs_core::result::AppResult;
use mirrorfs_entity::root::Root;

/// Outcome of a guarded root deletion.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RootDeleteOutcome {
    /// Virtual-folder marker rows removed alongside the root.
    pub markers_removed: u64,
    /// Whether a root row was actually removed.
    pub root_removed: bool,
}

/// Repository for root namespace rows.
#[derive(Debug, Clone)]
pub struct RootRepository {
    pool: PgPool,
}

impl RootRepository {
    /// Create a new root repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert-or-no-op upsert keyed on slug; returns the existing or new row.
    pub async fn ensure(&self, slug: &str, created_by: &str) -> AppResult<Root> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?;
        Self::ensure_with(&mut conn, slug, created_by).await
    }

    /// Transaction-scoped variant of [`ensure`](Self::ensure).
    pub async fn ensure_with(
        conn: &mut PgConnection,
        slug: &str,
        created_by: &str,
    ) -> AppResult<Root> {
        sqlx::query(
            "INSERT INTO roots (slug, title, created_by) VALUES ($1, $1, $2) \
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(slug)
        .bind(created_by)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to ensure root", e))?;

        sqlx::query_as::<_, Root>("SELECT * FROM roots WHERE slug = $1")
            .bind(slug)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load root", e))
    }

    /// Find a root by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Root>> {
        sqlx::query_as::<_, Root>("SELECT * FROM roots WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find root", e))
    }

    /// All root slugs, alphabetically.
    pub async fn list_slugs(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT slug FROM roots ORDER BY slug ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roots", e))
    }

    /// Whether a root row exists, inside a transaction.
    pub async fn exists_with(conn: &mut PgConnection, slug: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roots WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check root", e))
    }

    /// Change a root's slug in place, inside a transaction. Callers are
    /// responsible for the collision check.
    pub async fn rename_slug_with(
        conn: &mut PgConnection,
        old_slug: &str,
        new_slug: &str,
    ) -> AppResult<()> {
        sqlx::query("UPDATE roots SET slug = $2, title = $2 WHERE slug = $1")
            .bind(old_slug)
            .bind(new_slug)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename root", e))?;
        Ok(())
    }

    /// Number of *real* (non-marker) assets under a root.
    pub async fn count_real_assets(&self, slug: &str) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assets WHERE root_slug = $1 AND upload_status = 'uploaded'",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count root assets", e))
    }

    /// Remove the root row if no rows of any kind still reference it.
    ///
    /// Best-effort optimization after renames/deletes that may have emptied a
    /// root; callers swallow failures.
    pub async fn cleanup_if_empty(&self, slug: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM roots WHERE slug = $1 \
             AND NOT EXISTS (SELECT 1 FROM assets WHERE root_slug = $1)",
        )
        .bind(slug)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clean up root", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a root and its virtual markers, refusing while any real asset
    /// remains. Deleting an absent root is a successful no-op.
    pub async fn delete_guarded(&self, slug: &str) -> AppResult<RootDeleteOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let real: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assets WHERE root_slug = $1 AND upload_status = 'uploaded'",
        )
        .bind(slug)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count root assets", e)
        })?;

        if real > 0 {
            return Err(AppError::conflict(format!(
                "Root '{slug}' still contains {real} object(s)"
            )));
        }

        let markers = sqlx::query(
            "DELETE FROM assets WHERE root_slug = $1 AND upload_status = 'virtual-folder'",
        )
        .bind(slug)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete markers", e))?;

        let root = sqlx::query("DELETE FROM roots WHERE slug = $1")
            .bind(slug)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete root", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(RootDeleteOutcome {
            markers_removed: markers.rows_affected(),
            root_removed: root.rows_affected() > 0,
        })
    }
}
