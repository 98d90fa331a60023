//! Display paths for presentation.
//!
//! Progress and scan entries show paths relative to the parent of the item
//! being copied, so a file inside `/media/card/photos` shows up as
//! `photos/2024/img.jpg` whatever the absolute location of the card.

use std::path::{Path, PathBuf};

/// Path of `path` relative to the parent directory of `root`.
///
/// Falls back to `path` unchanged when it does not live below `root`'s
/// parent (or `root` has no parent, e.g. a filesystem root).
pub(crate) fn display_relative(root: &Path, path: &Path) -> PathBuf {
    root.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .and_then(|parent| path.strip_prefix(parent).ok())
        .map_or_else(|| path.to_path_buf(), Path::to_path_buf)
}

/// Display label of an item root.
pub(crate) fn item_label(root: &Path) -> String {
    display_relative(root, root).display().to_string()
}
