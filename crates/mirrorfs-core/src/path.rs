//! Path rules mapping between hierarchical display paths and flat remote keys.
//!
//! The remote store has no directory concept; folders are an illusion kept up
//! by the mirror and by key-string conventions. Everything here is pure string
//! manipulation with no I/O, so the engines can treat every hierarchical
//! operation as "compute new flat keys, then bulk-apply".

use crate::error::AppError;
use crate::result::AppResult;

/// Slug of the synthetic default root that single-segment paths map to.
pub const DEFAULT_ROOT: &str = "root";

/// Reserved key namespace for virtual-folder marker rows. Real object keys
/// never start with this prefix.
pub const FOLDER_MARKER_PREFIX: &str = "__folder__/";

/// A display path split into file semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPath {
    /// Root (first segment, or [`DEFAULT_ROOT`] for single-segment paths).
    pub root: String,
    /// Path within the root, including the file name.
    pub relative_path: String,
    /// Last segment.
    pub file_name: String,
}

/// A display path split into folder semantics.
///
/// Unlike file paths, a single-segment folder path is *only* the root and
/// carries no relative prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPath {
    /// Root (first segment).
    pub root: String,
    /// Folder prefix within the root, empty for the root itself.
    pub relative_prefix: String,
}

/// Split a path into its non-empty `/`-separated segments.
fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join two path fragments, collapsing repeated separators and stripping
/// leading/trailing ones. `join_path("", b) = b` and `join_path(a, "") = a`.
pub fn join_path(a: &str, b: &str) -> String {
    let mut parts = segments(a);
    parts.extend(segments(b));
    parts.join("/")
}

/// Split a display path with file semantics.
///
/// The first segment is the root; the remaining segments joined by `/` are
/// the relative path; the last segment is the file name. A single-segment
/// path maps to the synthetic default root with
/// `relative_path == file_name == segment`.
pub fn split_display_path(path: &str) -> AppResult<DisplayPath> {
    let segs = segments(path);
    match segs.as_slice() {
        [] => Err(AppError::validation("Path must not be empty")),
        [single] => Ok(DisplayPath {
            root: DEFAULT_ROOT.to_string(),
            relative_path: (*single).to_string(),
            file_name: (*single).to_string(),
        }),
        [root, .., last] => Ok(DisplayPath {
            root: (*root).to_string(),
            relative_path: segs[1..].join("/"),
            file_name: (*last).to_string(),
        }),
    }
}

/// Split a display path with folder semantics: a single segment is *only*
/// the root, with no relative prefix.
pub fn split_folder_path(path: &str) -> AppResult<FolderPath> {
    let segs = segments(path);
    match segs.as_slice() {
        [] => Err(AppError::validation("Folder path must not be empty")),
        [root] => Ok(FolderPath {
            root: (*root).to_string(),
            relative_prefix: String::new(),
        }),
        [root, rest @ ..] => Ok(FolderPath {
            root: (*root).to_string(),
            relative_prefix: rest.join("/"),
        }),
    }
}

/// Collapse the historical duplication bug where a two-segment key repeats
/// its segment (`name/name` becomes `name`).
///
/// Display only. Never call this from key-construction code: the bug must be
/// tolerated on read but never reintroduced on write.
pub fn normalize_display_key(key: &str) -> String {
    let segs = segments(key);
    match segs.as_slice() {
        [a, b] if a == b => (*a).to_string(),
        _ => segs.join("/"),
    }
}

/// The flat remote key for an object at `relative_path` within `root`.
///
/// The default root contributes no key prefix. Only used when constructing
/// *new* keys (uploads, renames); stored keys are never recomputed.
pub fn display_key(root: &str, relative_path: &str) -> String {
    if root == DEFAULT_ROOT {
        relative_path.to_string()
    } else {
        join_path(root, relative_path)
    }
}

/// The reserved marker key for a virtual folder.
pub fn folder_marker_key(root: &str, folder_path: &str) -> String {
    format!("{FOLDER_MARKER_PREFIX}{root}/{folder_path}")
}

/// Whether a key lives in the virtual-folder marker namespace.
pub fn is_marker_key(key: &str) -> bool {
    key.starts_with(FOLDER_MARKER_PREFIX)
}

/// Every proper prefix of a relative path, shallowest first.
///
/// `a/b/file.jpg` yields `["a", "a/b"]`.
pub fn ancestor_prefixes(relative_path: &str) -> Vec<String> {
    let segs = segments(relative_path);
    if segs.len() < 2 {
        return Vec::new();
    }
    (1..segs.len()).map(|n| segs[..n].join("/")).collect()
}

/// The remainder of `relative_path` below `prefix`, or `None` when the path
/// is outside the prefix's subtree.
///
/// An empty prefix matches everything; a path equal to the prefix yields an
/// empty suffix.
pub fn subtree_suffix(relative_path: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return Some(relative_path.to_string());
    }
    if relative_path == prefix {
        return Some(String::new());
    }
    relative_path
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("a", "b"), "a/b");
        assert_eq!(join_path("", "b"), "b");
        assert_eq!(join_path("a", ""), "a");
        assert_eq!(join_path("a/", "/b"), "a/b");
        assert_eq!(join_path("a//b", "c///d"), "a/b/c/d");
        assert_eq!(join_path("/a/b/", "c/"), "a/b/c");
        assert_eq!(join_path("", ""), "");
    }

    #[test]
    fn test_split_display_path_nested() {
        let p = split_display_path("photos/summer/beach.jpg").unwrap();
        assert_eq!(p.root, "photos");
        assert_eq!(p.relative_path, "summer/beach.jpg");
        assert_eq!(p.file_name, "beach.jpg");
    }

    #[test]
    fn test_split_display_path_single_segment_uses_default_root() {
        let p = split_display_path("beach.jpg").unwrap();
        assert_eq!(p.root, DEFAULT_ROOT);
        assert_eq!(p.relative_path, "beach.jpg");
        assert_eq!(p.file_name, "beach.jpg");
    }

    #[test]
    fn test_split_display_path_collapses_separators() {
        let p = split_display_path("/photos//summer/beach.jpg/").unwrap();
        assert_eq!(p.root, "photos");
        assert_eq!(p.relative_path, "summer/beach.jpg");
    }

    #[test]
    fn test_split_display_path_empty_is_rejected() {
        assert!(split_display_path("").is_err());
        assert!(split_display_path("///").is_err());
    }

    #[test]
    fn test_split_folder_path_single_segment_is_root_only() {
        let f = split_folder_path("photos").unwrap();
        assert_eq!(f.root, "photos");
        assert_eq!(f.relative_prefix, "");
    }

    #[test]
    fn test_split_folder_path_nested() {
        let f = split_folder_path("photos/summer/2024").unwrap();
        assert_eq!(f.root, "photos");
        assert_eq!(f.relative_prefix, "summer/2024");
    }

    #[test]
    fn test_round_trip_display_paths() {
        for path in [
            "photos/summer/beach.jpg",
            "docs/readme.txt",
            "a/b/c/d/e.png",
        ] {
            let p = split_display_path(path).unwrap();
            assert_eq!(join_path(&p.root, &p.relative_path), path);
        }
    }

    #[test]
    fn test_round_trip_default_root_key() {
        let p = split_display_path("beach.jpg").unwrap();
        assert_eq!(display_key(&p.root, &p.relative_path), "beach.jpg");
    }

    #[test]
    fn test_normalize_display_key_collapses_duplicate_pair() {
        assert_eq!(normalize_display_key("logo.png/logo.png"), "logo.png");
        assert_eq!(normalize_display_key("a/b"), "a/b");
        assert_eq!(normalize_display_key("a/a/a"), "a/a/a");
        assert_eq!(normalize_display_key("a"), "a");
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key("photos", "summer/beach.jpg"), "photos/summer/beach.jpg");
        assert_eq!(display_key(DEFAULT_ROOT, "beach.jpg"), "beach.jpg");
    }

    #[test]
    fn test_folder_marker_key() {
        assert_eq!(
            folder_marker_key("photos", "summer/2024"),
            "__folder__/photos/summer/2024"
        );
        assert!(is_marker_key(&folder_marker_key("photos", "a")));
        assert!(!is_marker_key("photos/a.jpg"));
    }

    #[test]
    fn test_ancestor_prefixes() {
        assert_eq!(
            ancestor_prefixes("a/b/file.jpg"),
            vec!["a".to_string(), "a/b".to_string()]
        );
        assert!(ancestor_prefixes("file.jpg").is_empty());
        assert!(ancestor_prefixes("").is_empty());
    }

    #[test]
    fn test_subtree_suffix() {
        assert_eq!(subtree_suffix("a/b/c.jpg", "a"), Some("b/c.jpg".to_string()));
        assert_eq!(subtree_suffix("a/b", "a/b"), Some(String::new()));
        assert_eq!(subtree_suffix("a/b.jpg", ""), Some("a/b.jpg".to_string()));
        assert_eq!(subtree_suffix("ab/c.jpg", "a"), None);
        assert_eq!(subtree_suffix("z/c.jpg", "a"), None);
    }
}
