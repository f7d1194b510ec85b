//! Pure assembly of listing entries from mirror rows and marker paths.

use std::collections::{BTreeMap, BTreeSet};

use mirrorfs_core::path;
use mirrorfs_entity::asset::Asset;
use mirrorfs_entity::listing::{EntryKind, FsEntry};

/// Filters applied to a listing.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Folder prefix within the root; `None` lists the root itself.
    pub prefix: Option<String>,
    /// Include every intermediate ancestor folder instead of direct
    /// children only.
    pub deep: bool,
    /// Synthesize folder entries at all.
    pub include_folders: bool,
}

/// Assemble the final listing: synthesized folders first, then files, both
/// alphabetical.
///
/// Virtual-folder rows never appear as files; the marker paths feed the
/// folder synthesis instead. Missing derived fields (display path, name,
/// mime type) are backfilled here.
pub fn assemble_entries(
    root: &str,
    rows: &[Asset],
    marker_paths: &[String],
    opts: &ListOptions,
) -> Vec<FsEntry> {
    let prefix = opts.prefix.as_deref().unwrap_or("");

    let real: Vec<&Asset> = rows
        .iter()
        .filter(|row| !row.is_virtual() && !path::is_marker_key(&row.remote_key))
        .filter(|row| path::subtree_suffix(&row.relative_path, prefix).is_some())
        .collect();

    let mut folders = if opts.include_folders {
        if opts.deep {
            deep_folders(root, &real, marker_paths, prefix)
        } else {
            direct_folders(root, &real, marker_paths, prefix)
        }
    } else {
        Vec::new()
    };

    let mut files: Vec<FsEntry> = real.iter().map(|row| file_entry(root, row)).collect();

    folders.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    folders.extend(files);
    folders
}

/// Build one file entry, backfilling name, display path, and mime type.
fn file_entry(root: &str, row: &Asset) -> FsEntry {
    let name = if row.file_name.is_empty() {
        row.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(row.relative_path.as_str())
            .to_string()
    } else {
        row.file_name.clone()
    };
    let mime_type = row.mime_type.clone().or_else(|| {
        mime_guess::from_path(&name)
            .first_raw()
            .map(String::from)
    });
    let display = path::normalize_display_key(&path::join_path(root, &row.relative_path));

    FsEntry {
        kind: EntryKind::File,
        name,
        path: display,
        remote_key: Some(row.remote_key.clone()),
        size_bytes: row.size_bytes,
        mime_type,
        width: row.width,
        height: row.height,
        uploaded_at: row.remote_uploaded_at,
        child_count: None,
    }
}

/// Direct child folders of `prefix`, with subtree child counts and byte
/// totals aggregated from the real rows.
fn direct_folders(
    root: &str,
    real: &[&Asset],
    marker_paths: &[String],
    prefix: &str,
) -> Vec<FsEntry> {
    let mut aggregates: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for row in real {
        let Some(rest) = path::subtree_suffix(&row.relative_path, prefix) else {
            continue;
        };
        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            continue;
        };
        if segments.next().is_some() {
            let slot = aggregates.entry(first.to_string()).or_default();
            slot.0 += 1;
            slot.1 += row.size_bytes.unwrap_or(0);
        }
    }

    let mut names: BTreeSet<String> = aggregates.keys().cloned().collect();
    for marker in marker_paths {
        let Some(rest) = path::subtree_suffix(marker, prefix) else {
            continue;
        };
        if let Some(first) = rest.split('/').find(|s| !s.is_empty()) {
            names.insert(first.to_string());
        }
    }

    names
        .into_iter()
        .map(|name| {
            let folder_path = path::join_path(prefix, &name);
            let mut entry = FsEntry::folder(name.clone(), path::join_path(root, &folder_path));
            if let Some((count, bytes)) = aggregates.get(&name) {
                entry.child_count = Some(*count);
                entry.size_bytes = Some(*bytes);
            }
            entry
        })
        .collect()
}

/// Every intermediate ancestor folder under `prefix`, from both real rows
/// and marker rows.
fn deep_folders(
    root: &str,
    real: &[&Asset],
    marker_paths: &[String],
    prefix: &str,
) -> Vec<FsEntry> {
    let mut folder_paths: BTreeSet<String> = BTreeSet::new();

    for row in real {
        for ancestor in path::ancestor_prefixes(&row.relative_path) {
            if matches!(path::subtree_suffix(&ancestor, prefix), Some(ref s) if !s.is_empty()) {
                folder_paths.insert(ancestor);
            }
        }
    }
    for marker in marker_paths {
        if matches!(path::subtree_suffix(marker, prefix), Some(ref s) if !s.is_empty()) {
            folder_paths.insert(marker.clone());
        }
        for ancestor in path::ancestor_prefixes(marker) {
            if matches!(path::subtree_suffix(&ancestor, prefix), Some(ref s) if !s.is_empty()) {
                folder_paths.insert(ancestor);
            }
        }
    }

    folder_paths
        .into_iter()
        .map(|folder_path| {
            let name = folder_path
                .rsplit('/')
                .next()
                .unwrap_or(folder_path.as_str())
                .to_string();
            FsEntry::folder(name, path::join_path(root, &folder_path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mirrorfs_entity::asset::UploadStatus;
    use uuid::Uuid;

    fn real(root: &str, rel: &str, size: i64) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            remote_key: path::display_key(root, rel),
            root_slug: root.to_string(),
            relative_path: rel.to_string(),
            file_name: rel.rsplit('/').next().unwrap_or(rel).to_string(),
            size_bytes: Some(size),
            mime_type: None,
            width: None,
            height: None,
            upload_status: UploadStatus::Uploaded,
            remote_uploaded_at: None,
            created_at: Utc::now(),
        }
    }

    fn marker(root: &str, rel: &str) -> Asset {
        let mut row = real(root, rel, 0);
        row.remote_key = path::folder_marker_key(root, rel);
        row.upload_status = UploadStatus::VirtualFolder;
        row.size_bytes = None;
        row
    }

    fn list_all() -> ListOptions {
        ListOptions {
            prefix: None,
            deep: false,
            include_folders: true,
        }
    }

    #[test]
    fn test_folders_come_first_then_files_alphabetically() {
        let rows = vec![
            real("r", "zebra.jpg", 1),
            real("r", "apple.jpg", 1),
            real("r", "box/1.jpg", 1),
            real("r", "attic/2.jpg", 1),
        ];
        let entries = assemble_entries("r", &rows, &[], &list_all());
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["attic", "box", "apple.jpg", "zebra.jpg"]);
        assert_eq!(entries[0].kind, EntryKind::Folder);
        assert_eq!(entries[2].kind, EntryKind::File);
    }

    #[test]
    fn test_virtual_rows_never_appear_as_files() {
        let rows = vec![real("r", "a/1.jpg", 1), marker("r", "empty")];
        let entries = assemble_entries("r", &rows, &["empty".to_string()], &list_all());

        assert!(entries
            .iter()
            .all(|e| !e.path.starts_with(path::FOLDER_MARKER_PREFIX)));
        let files: Vec<_> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "1.jpg");
        // The marker still surfaces as a folder.
        assert!(entries
            .iter()
            .any(|e| e.kind == EntryKind::Folder && e.name == "empty"));
    }

    #[test]
    fn test_direct_children_aggregate_subtree_counts() {
        let rows = vec![
            real("r", "a/1.jpg", 10),
            real("r", "a/b/2.jpg", 20),
            real("r", "c.jpg", 5),
        ];
        let entries = assemble_entries("r", &rows, &[], &list_all());

        let folder = entries.iter().find(|e| e.name == "a").unwrap();
        assert_eq!(folder.child_count, Some(2));
        assert_eq!(folder.size_bytes, Some(30));
        // `a/b` is not a direct child of the root.
        assert!(!entries.iter().any(|e| e.name == "b"));
    }

    #[test]
    fn test_deep_listing_includes_every_ancestor() {
        let rows = vec![real("r", "a/b/c/3.jpg", 1)];
        let opts = ListOptions {
            prefix: None,
            deep: true,
            include_folders: true,
        };
        let entries = assemble_entries("r", &rows, &[], &opts);
        let folders: Vec<_> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Folder)
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(folders, vec!["r/a", "r/a/b", "r/a/b/c"]);
    }

    #[test]
    fn test_prefix_scopes_both_files_and_folders() {
        let rows = vec![
            real("r", "a/1.jpg", 1),
            real("r", "a/b/2.jpg", 1),
            real("r", "other/3.jpg", 1),
        ];
        let opts = ListOptions {
            prefix: Some("a".to_string()),
            deep: false,
            include_folders: true,
        };
        let entries = assemble_entries("r", &rows, &[], &opts);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "1.jpg", "2.jpg"]);
        assert_eq!(entries[0].path, "r/a/b");
    }

    #[test]
    fn test_mime_type_backfilled_by_extension() {
        let rows = vec![real("r", "a/photo.png", 1)];
        let entries = assemble_entries("r", &rows, &[], &list_all());
        let file = entries.iter().find(|e| e.kind == EntryKind::File).unwrap();
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_duplicated_segment_keys_normalize_for_display_only() {
        let rows = vec![real("logo.png", "logo.png", 1)];
        let entries = assemble_entries("logo.png", &rows, &[], &list_all());
        let file = &entries[0];
        assert_eq!(file.path, "logo.png");
        // The stored key keeps the historical shape.
        assert_eq!(file.remote_key.as_deref(), Some("logo.png/logo.png"));
    }

    #[test]
    fn test_include_folders_false_lists_only_files() {
        let rows = vec![real("r", "a/1.jpg", 1)];
        let opts = ListOptions {
            prefix: None,
            deep: false,
            include_folders: false,
        };
        let entries = assemble_entries("r", &rows, &["empty".to_string()], &opts);
        assert!(entries.iter().all(|e| e.kind == EntryKind::File));
    }
}
