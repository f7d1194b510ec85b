//! Listing service: mirror reads with opportunistic reconciliation.

use serde::Serialize;
use tracing::warn;

use mirrorfs_core::error::AppError;
use mirrorfs_core::path;
use mirrorfs_core::result::AppResult;
use mirrorfs_database::repositories::{AssetRepository, RootRepository, VirtualFolderRepository};
use mirrorfs_entity::listing::FsEntry;

use crate::context::RequestContext;
use crate::sync::SyncService;

use super::assemble::{assemble_entries, ListOptions};

/// A listing plus any non-fatal diagnostics gathered while producing it.
#[derive(Debug, Clone, Serialize)]
pub struct BrowseResult {
    /// Folders-first listing entries.
    pub entries: Vec<FsEntry>,
    /// Non-fatal problems (a failed opportunistic sync, for example); the
    /// listing itself reflects whatever the mirror already had.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// Serves filesystem listings from the mirror.
#[derive(Debug, Clone)]
pub struct ListingService {
    assets: AssetRepository,
    roots: RootRepository,
    markers: VirtualFolderRepository,
    sync: SyncService,
    sync_on_read: bool,
}

impl ListingService {
    /// Create a new listing service.
    pub fn new(
        assets: AssetRepository,
        roots: RootRepository,
        markers: VirtualFolderRepository,
        sync: SyncService,
        sync_on_read: bool,
    ) -> Self {
        Self {
            assets,
            roots,
            markers,
            sync,
            sync_on_read,
        }
    }

    /// List the assets of one root, optionally scoped to a folder prefix.
    ///
    /// When sync-on-read is enabled, a passive scoped sync runs first; its
    /// failure never fails the read and is reported through diagnostics
    /// instead.
    pub async fn browse(
        &self,
        root: &str,
        opts: ListOptions,
        ctx: &RequestContext,
    ) -> AppResult<BrowseResult> {
        if root.trim().is_empty() {
            return Err(AppError::validation("Root must not be empty"));
        }

        let mut diagnostics = Vec::new();
        if self.sync_on_read {
            let key_prefix = path::display_key(root, opts.prefix.as_deref().unwrap_or(""));
            let key_prefix = (!key_prefix.is_empty()).then_some(key_prefix);
            if let Err(err) = self
                .sync
                .sync_from_remote(key_prefix.as_deref(), false, ctx)
                .await
            {
                warn!(root, %err, "Opportunistic sync failed; serving mirror state");
                diagnostics.push(format!("sync skipped: {err}"));
            }
        }

        let rows = self.assets.list_real(root, opts.prefix.as_deref()).await?;
        let marker_paths = if opts.include_folders {
            self.markers.marker_paths(root, opts.prefix.as_deref()).await?
        } else {
            Vec::new()
        };

        Ok(BrowseResult {
            entries: assemble_entries(root, &rows, &marker_paths, &opts),
            diagnostics,
        })
    }

    /// Every virtual folder path: all root slugs when no root is given,
    /// otherwise the marker paths inside the root (scoped to a prefix).
    pub async fn list_virtual_folders(
        &self,
        root: Option<&str>,
        prefix: Option<&str>,
    ) -> AppResult<Vec<String>> {
        match root {
            None => self.roots.list_slugs().await,
            Some(root) => self.markers.marker_paths(root, prefix).await,
        }
    }
}
