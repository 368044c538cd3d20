//! Path utility functions for segment matching and display.

use std::path::{Component, Path, PathBuf};

/// Check whether any component of `path` below `root` equals one of `names`.
///
/// Matching is per path segment and ASCII case-insensitive, so `obj` excludes
/// `src/Core/obj/Debug` and `src/Core/OBJ` but not `src/objects`.
/// Segments of `root` itself are not considered.
pub fn has_excluded_segment(root: &Path, path: &Path, names: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(segment) => segment
            .to_str()
            .is_some_and(|s| names.iter().any(|name| name.eq_ignore_ascii_case(s))),
        _ => false,
    })
}

/// Render `path` relative to `root` for log and report output.
///
/// Falls back to the path as given if no relative form exists
/// (e.g., different drive letters on Windows).
pub fn display_relative(root: &Path, path: &Path) -> PathBuf {
    match pathdiff::diff_paths(path, root) {
        Some(relative) if !relative.is_absolute() && !relative.as_os_str().is_empty() => relative,
        _ => path.to_path_buf(),
    }
}
