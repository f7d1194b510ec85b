//! # mirrorfs-service
//!
//! Orchestration layer for MirrorFS: the rename, delete, listing,
//! virtual-folder, and reconciliation engines, plus the request context.
//! Services own the transaction boundaries; repositories own the SQL.

pub mod context;
pub mod delete;
pub mod folder;
pub mod listing;
pub mod rename;
pub mod sync;

use std::sync::Arc;

use sqlx::PgPool;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::traits::remote::RemoteStore;
use mirrorfs_database::repositories::{AssetRepository, RootRepository, VirtualFolderRepository};

pub use context::RequestContext;

/// All services wired together, constructed once at process start and passed
/// by reference.
#[derive(Debug, Clone)]
pub struct Services {
    /// Filesystem listing with opportunistic sync.
    pub listing: listing::ListingService,
    /// File/folder/root rename.
    pub rename: rename::RenameService,
    /// File/folder/root delete.
    pub delete: delete::DeleteService,
    /// Virtual-folder create/delete.
    pub folder: folder::FolderService,
    /// Reconciliation between remote store and mirror.
    pub sync: sync::SyncService,
}

impl Services {
    /// Wire every service over one pool and one remote store client.
    pub fn new(pool: PgPool, remote: Arc<dyn RemoteStore>, config: &AppConfig) -> Self {
        let roots = RootRepository::new(pool.clone());
        let assets = AssetRepository::new(pool.clone());
        let markers = VirtualFolderRepository::new(pool.clone());

        let sync = sync::SyncService::new(
            assets.clone(),
            Arc::clone(&remote),
            config.remote.list_max,
        );
        let listing = listing::ListingService::new(
            assets.clone(),
            roots.clone(),
            markers.clone(),
            sync.clone(),
            config.sync.sync_on_read,
        );
        let rename = rename::RenameService::new(pool.clone(), roots.clone());
        let delete = delete::DeleteService::new(
            pool,
            roots.clone(),
            assets,
            remote,
            config.sync.delete_window,
            config.remote.list_max,
        );
        let folder = folder::FolderService::new(roots, markers);

        Self {
            listing,
            rename,
            delete,
            folder,
            sync,
        }
    }
}
