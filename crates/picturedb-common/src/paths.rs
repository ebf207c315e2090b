//! Path utilities for the picture index.
//!
//! This module decides which files are pictures (by extension), normalises
//! scan roots so stored paths have a single spelling, and derives the
//! directory components kept next to every indexed picture for grouping.

use std::path::{Component, Path, PathBuf};

/// Extensions (lowercase, without the dot) of files that get indexed.
const PICTURE_EXTENSIONS: &[&str] = &["heic", "jpg"];

/// Number of leading directory segments stored as separate columns.
const DIR_LEVELS: usize = 3;

/// Check if a path has a picture file extension.
///
/// The comparison is case-insensitive.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use picturedb_common::paths::is_picture_file;
///
/// assert!(is_picture_file(Path::new("IMG_0001.jpg")));
/// assert!(is_picture_file(Path::new("/photos/IMG_0002.HEIC")));
/// assert!(!is_picture_file(Path::new("IMG_0003.png")));
/// ```
pub fn is_picture_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PICTURE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lexically normalise a path.
///
/// Drops `.` segments as well as duplicate and trailing separators. The
/// filesystem is never consulted, so relative paths stay relative. An empty
/// result is returned as `.`.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use picturedb_common::paths::normalize_path;
///
/// assert_eq!(normalize_path(Path::new("./photos//2020/")), PathBuf::from("photos/2020"));
/// assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
/// ```
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Convert a path into the string key used by the index.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Directory information derived from a picture path.
///
/// `dir1`..`dir3` hold the first three directory segments; paths with fewer
/// segments leave the deeper ones unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryComponents {
    /// Parent directory of the picture (`.` for bare file names).
    pub dir: String,
    pub dir1: Option<String>,
    pub dir2: Option<String>,
    pub dir3: Option<String>,
    /// Every segment of the path, file name included.
    pub components: Vec<String>,
}

impl DirectoryComponents {
    /// Derive the directory components of a picture path.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use picturedb_common::DirectoryComponents;
    ///
    /// let dirs = DirectoryComponents::from_path(Path::new("/photos/2020/a.jpg"));
    /// assert_eq!(dirs.dir, "/photos/2020");
    /// assert_eq!(dirs.dir1.as_deref(), Some("photos"));
    /// assert_eq!(dirs.dir2.as_deref(), Some("2020"));
    /// assert_eq!(dirs.dir3, None);
    /// assert_eq!(dirs.components, vec!["photos", "2020", "a.jpg"]);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        let components: Vec<String> = segments(path);

        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        let dir = if parent.as_os_str().is_empty() {
            ".".to_string()
        } else {
            parent.to_string_lossy().into_owned()
        };

        let mut levels = segments(parent).into_iter().take(DIR_LEVELS);

        Self {
            dir,
            dir1: levels.next(),
            dir2: levels.next(),
            dir3: levels.next(),
            components,
        }
    }
}

/// Named segments of a path; root, prefix and `.` components are skipped.
fn segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => None,
        })
        .collect()
}
