//! Creating and deleting virtual (empty) folders.

use serde::Serialize;
use tracing::info;

use mirrorfs_core::path;
use mirrorfs_core::result::AppResult;
use mirrorfs_database::repositories::{RootRepository, VirtualFolderRepository};

use crate::context::RequestContext;

/// Descriptor of a created virtual folder.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualFolderCreated {
    /// Root the folder lives under.
    pub root: String,
    /// Folder path within the root; empty when only the root was created.
    pub path: String,
    /// Marker rows written (one per ancestor level; zero for a bare root).
    pub markers_created: usize,
}

/// Result of a virtual-folder deletion.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualFolderDeleted {
    /// Marker rows removed.
    pub markers_removed: u64,
    /// Whether a root row was removed as well.
    pub root_removed: bool,
}

/// Manages virtual folders: folders that exist only in the mirror.
#[derive(Debug, Clone)]
pub struct FolderService {
    roots: RootRepository,
    markers: VirtualFolderRepository,
}

impl FolderService {
    /// Create a new folder service.
    pub fn new(roots: RootRepository, markers: VirtualFolderRepository) -> Self {
        Self { roots, markers }
    }

    /// Create a virtual folder at a display path.
    ///
    /// A root-only path just ensures the root exists. A nested path writes
    /// one idempotent marker row per ancestor level (`a`, `a/b`, `a/b/c`).
    pub async fn create_virtual_folder(
        &self,
        folder_path: &str,
        ctx: &RequestContext,
    ) -> AppResult<VirtualFolderCreated> {
        let folder = path::split_folder_path(folder_path)?;

        if folder.relative_prefix.is_empty() {
            self.roots.ensure(&folder.root, &ctx.actor).await?;
            info!(root = %folder.root, actor = %ctx.actor, "Root ensured");
            return Ok(VirtualFolderCreated {
                root: folder.root,
                path: String::new(),
                markers_created: 0,
            });
        }

        let mut levels = path::ancestor_prefixes(&folder.relative_prefix);
        levels.push(folder.relative_prefix.clone());

        let markers_created = self
            .markers
            .create_markers(&folder.root, &levels, &ctx.actor)
            .await?;

        info!(
            root = %folder.root,
            path = %folder.relative_prefix,
            markers_created,
            actor = %ctx.actor,
            "Virtual folder created"
        );

        Ok(VirtualFolderCreated {
            root: folder.root,
            path: folder.relative_prefix,
            markers_created,
        })
    }

    /// Delete a virtual folder.
    ///
    /// Root-level deletion refuses with a conflict while any real asset
    /// remains, then removes all markers and the root row. Nested deletion
    /// removes only marker rows in the subtree and never touches real
    /// assets.
    pub async fn delete_virtual_folder(&self, folder_path: &str) -> AppResult<VirtualFolderDeleted> {
        let folder = path::split_folder_path(folder_path)?;

        if folder.relative_prefix.is_empty() {
            let outcome = self.roots.delete_guarded(&folder.root).await?;
            info!(
                root = %folder.root,
                markers_removed = outcome.markers_removed,
                "Root and markers deleted"
            );
            return Ok(VirtualFolderDeleted {
                markers_removed: outcome.markers_removed,
                root_removed: outcome.root_removed,
            });
        }

        let markers_removed = self
            .markers
            .delete_subtree(&folder.root, &folder.relative_prefix)
            .await?;

        info!(
            root = %folder.root,
            path = %folder.relative_prefix,
            markers_removed,
            "Virtual folder deleted"
        );

        Ok(VirtualFolderDeleted {
            markers_removed,
            root_removed: false,
        })
    }
}
