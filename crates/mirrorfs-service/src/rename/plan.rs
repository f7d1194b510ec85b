//! Pure planning for folder renames: compute new flat keys, then let the
//! service bulk-apply them.

use mirrorfs_core::error::AppError;
use mirrorfs_core::path::{self, FolderPath};
use mirrorfs_core::result::AppResult;
use mirrorfs_entity::asset::{Asset, AssetRename};
use uuid::Uuid;

/// The staged outcome of planning a folder rename.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    /// One identity change per affected row.
    pub renames: Vec<AssetRename>,
    /// Every staged destination key, for the collision check.
    pub staged_keys: Vec<String>,
    /// Ids of the rows being renamed (excluded from the collision check).
    pub source_ids: Vec<Uuid>,
}

/// Graft every selected row's suffix onto the new prefix.
///
/// Virtual rows keep their keys in the marker namespace; real rows get plain
/// display keys. A virtual row whose path collapses into the bare new root
/// is dropped (the root row itself takes its place); a real row collapsing
/// that way is invalid input.
pub fn plan_folder_renames(
    rows: &[Asset],
    old: &FolderPath,
    new: &FolderPath,
) -> AppResult<RenamePlan> {
    let mut renames = Vec::with_capacity(rows.len());

    for row in rows {
        let suffix = path::subtree_suffix(&row.relative_path, &old.relative_prefix)
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Row '{}' is outside the renamed subtree '{}'",
                    row.relative_path, old.relative_prefix
                ))
            })?;
        let relative_path = path::join_path(&new.relative_prefix, &suffix);

        if relative_path.is_empty() {
            if row.is_virtual() {
                continue;
            }
            return Err(AppError::validation(format!(
                "Cannot rename file '{}' onto root '{}'",
                row.relative_path, new.root
            )));
        }

        let file_name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str())
            .to_string();
        let remote_key = if row.is_virtual() {
            path::folder_marker_key(&new.root, &relative_path)
        } else {
            path::display_key(&new.root, &relative_path)
        };

        renames.push(AssetRename {
            asset_id: row.id,
            remote_key,
            root_slug: new.root.clone(),
            relative_path,
            file_name,
        });
    }

    let staged_keys = renames.iter().map(|r| r.remote_key.clone()).collect();
    let source_ids = renames.iter().map(|r| r.asset_id).collect();

    Ok(RenamePlan {
        renames,
        staged_keys,
        source_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mirrorfs_core::path::split_folder_path;
    use mirrorfs_entity::asset::UploadStatus;

    fn real_row(root: &str, rel: &str) -> Asset {
        row(root, rel, UploadStatus::Uploaded)
    }

    fn marker_row(root: &str, rel: &str) -> Asset {
        row(root, rel, UploadStatus::VirtualFolder)
    }

    fn row(root: &str, rel: &str, status: UploadStatus) -> Asset {
        let key = match status {
            UploadStatus::Uploaded => path::display_key(root, rel),
            UploadStatus::VirtualFolder => path::folder_marker_key(root, rel),
        };
        Asset {
            id: Uuid::new_v4(),
            remote_key: key,
            root_slug: root.to_string(),
            relative_path: rel.to_string(),
            file_name: rel.rsplit('/').next().unwrap_or(rel).to_string(),
            size_bytes: None,
            mime_type: None,
            width: None,
            height: None,
            upload_status: status,
            remote_uploaded_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_folder_rename_moves_every_descendant() {
        let rows = vec![
            real_row("r", "a/1.jpg"),
            real_row("r", "a/b/2.jpg"),
            real_row("r", "a/b/c/3.jpg"),
        ];
        let old = split_folder_path("r/a").unwrap();
        let new = split_folder_path("r/z").unwrap();

        let plan = plan_folder_renames(&rows, &old, &new).unwrap();
        let paths: Vec<_> = plan
            .renames
            .iter()
            .map(|r| r.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["z/1.jpg", "z/b/2.jpg", "z/b/c/3.jpg"]);
        assert_eq!(plan.staged_keys[0], "r/z/1.jpg");
        assert!(paths.iter().all(|p| !p.starts_with("a/")));
    }

    #[test]
    fn test_marker_rows_stay_in_marker_namespace() {
        let rows = vec![marker_row("r", "a"), marker_row("r", "a/b")];
        let old = split_folder_path("r/a").unwrap();
        let new = split_folder_path("r/z").unwrap();

        let plan = plan_folder_renames(&rows, &old, &new).unwrap();
        assert_eq!(plan.renames[0].remote_key, "__folder__/r/z");
        assert_eq!(plan.renames[1].remote_key, "__folder__/r/z/b");
        assert_eq!(plan.renames[1].file_name, "b");
    }

    #[test]
    fn test_cross_root_rename_rewrites_root_and_key() {
        let rows = vec![real_row("r", "a/1.jpg")];
        let old = split_folder_path("r/a").unwrap();
        let new = split_folder_path("s/moved").unwrap();

        let plan = plan_folder_renames(&rows, &old, &new).unwrap();
        assert_eq!(plan.renames[0].root_slug, "s");
        assert_eq!(plan.renames[0].remote_key, "s/moved/1.jpg");
        assert_eq!(plan.renames[0].relative_path, "moved/1.jpg");
    }

    #[test]
    fn test_whole_root_rename_uses_empty_prefixes() {
        let rows = vec![real_row("r", "a/1.jpg"), real_row("r", "2.jpg")];
        let old = split_folder_path("r").unwrap();
        let new = split_folder_path("z").unwrap();

        let plan = plan_folder_renames(&rows, &old, &new).unwrap();
        let keys: Vec<_> = plan.renames.iter().map(|r| r.remote_key.as_str()).collect();
        assert_eq!(keys, vec!["z/a/1.jpg", "z/2.jpg"]);
    }

    #[test]
    fn test_folder_marker_collapsing_into_root_is_dropped() {
        let rows = vec![marker_row("r", "a"), real_row("r", "a/1.jpg")];
        let old = split_folder_path("r/a").unwrap();
        let new = split_folder_path("z").unwrap();

        let plan = plan_folder_renames(&rows, &old, &new).unwrap();
        // The marker for the folder itself collapses into the root row.
        assert_eq!(plan.renames.len(), 1);
        assert_eq!(plan.renames[0].remote_key, "z/1.jpg");
    }

    #[test]
    fn test_file_collapsing_into_root_is_rejected() {
        let rows = vec![real_row("r", "a")];
        let old = split_folder_path("r/a").unwrap();
        let new = split_folder_path("z").unwrap();

        assert!(plan_folder_renames(&rows, &old, &new).is_err());
    }

    #[test]
    fn test_default_root_keys_have_no_prefix() {
        let rows = vec![real_row("photos", "a/1.jpg")];
        let old = split_folder_path("photos/a").unwrap();
        let new = FolderPath {
            root: path::DEFAULT_ROOT.to_string(),
            relative_prefix: "a".to_string(),
        };

        let plan = plan_folder_renames(&rows, &old, &new).unwrap();
        assert_eq!(plan.renames[0].remote_key, "a/1.jpg");
    }
}
