//! Listing the remote store into the mirror.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use mirrorfs_core::result::AppResult;
use mirrorfs_core::traits::remote::{RemoteObject, RemoteStore};
use mirrorfs_database::repositories::AssetRepository;
use mirrorfs_entity::asset::AssetUpload;

use crate::context::RequestContext;

/// Counters from one reconciliation pass.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SyncOutcome {
    /// Objects returned by the remote listing.
    pub scanned: usize,
    /// Mirror rows inserted or updated.
    pub upserted: usize,
    /// Records skipped (no metadata on a passive sync, or marker-namespace
    /// keys).
    pub skipped: usize,
}

/// Pulls remote listings into the mirror.
#[derive(Debug, Clone)]
pub struct SyncService {
    assets: AssetRepository,
    remote: Arc<dyn RemoteStore>,
    list_max: usize,
}

impl SyncService {
    /// Create a new sync service.
    pub fn new(assets: AssetRepository, remote: Arc<dyn RemoteStore>, list_max: usize) -> Self {
        Self {
            assets,
            remote,
            list_max,
        }
    }

    /// List the remote store (optionally scoped by key prefix) and upsert
    /// the result into the mirror.
    ///
    /// Passive syncs (`manual = false`) skip records without metadata so a
    /// listing-only pass never erases richer data; a manual sync accepts the
    /// coarser records.
    pub async fn sync_from_remote(
        &self,
        key_prefix: Option<&str>,
        manual: bool,
        ctx: &RequestContext,
    ) -> AppResult<SyncOutcome> {
        let objects = self.remote.list_all(key_prefix, self.list_max).await?;
        let scanned = objects.len();

        let uploads: Vec<AssetUpload> = objects.into_iter().map(to_upload).collect();
        let outcome = self
            .assets
            .upsert_batch(&uploads, !manual, &ctx.actor)
            .await?;

        info!(
            prefix = key_prefix.unwrap_or(""),
            manual,
            scanned,
            upserted = outcome.upserted,
            skipped = outcome.skipped,
            "Mirror sync completed"
        );

        Ok(SyncOutcome {
            scanned,
            upserted: outcome.upserted,
            skipped: outcome.skipped,
        })
    }
}

/// Map a listed remote object onto an upsert record.
fn to_upload(object: RemoteObject) -> AssetUpload {
    AssetUpload {
        remote_key: object.key,
        size_bytes: object.size_bytes,
        mime_type: object.mime_type,
        width: object.width,
        height: object.height,
        uploaded_at: object.uploaded_at,
    }
}
