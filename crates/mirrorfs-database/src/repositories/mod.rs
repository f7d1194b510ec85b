//! Mirror repositories.

pub mod asset;
pub mod root;
pub mod virtual_folder;

pub use asset::AssetRepository;
pub use root::{RootDeleteOutcome, RootRepository};
pub use virtual_folder::VirtualFolderRepository;

/// Build a `LIKE` pattern matching the subtree below `prefix`, escaping the
/// pattern metacharacters so user paths cannot widen the match.
pub(crate) fn like_prefix(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}/%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_prefix_escapes_metacharacters() {
        assert_eq!(like_prefix("a/b"), "a/b/%");
        assert_eq!(like_prefix("100%_done"), "100\\%\\_done/%");
        assert_eq!(like_prefix("back\\slash"), "back\\\\slash/%");
    }
}
