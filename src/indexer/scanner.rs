//! Filesystem scanning for picture files.

use anyhow::{Context, Result};
use picturedb_common::paths::{is_picture_file, normalize_path};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every picture file under `root`.
///
/// Paths are joined onto `root` and lexically normalised, so a root of `.`
/// yields bare relative paths. Any error while walking aborts the scan.
pub fn scan_pictures(root: &Path) -> Result<HashSet<PathBuf>> {
    let mut found = HashSet::new();

    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to scan {:?}", root))?;

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if is_picture_file(path) {
            found.insert(normalize_path(path));
        }
    }

    tracing::debug!("Found {} pictures under {:?}", found.len(), root);
    Ok(found)
}
