//! Internal Rust models matching the database schema.
//!
//! This module provides strongly-typed Rust structures that map to database
//! tables, plus the membership pairs produced by grouping queries.

use chrono::{DateTime, Utc};
use picturedb_common::DirectoryComponents;
use serde::{Deserialize, Serialize};

/// Indexed picture model (one row of `pictures`).
///
/// Extracted fields are `None` when the extractor did not report them; an
/// absent rating is not the same thing as a rating of zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Picture {
    pub path: String,
    pub dir: String,
    pub dir1: Option<String>,
    pub dir2: Option<String>,
    pub dir3: Option<String>,
    pub components: Vec<String>,
    /// Filesystem modification time observed when the row was written.
    pub file_modified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Last-indexed timestamp, never earlier than `file_modified_at`.
    pub updated_at: DateTime<Utc>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub date_time_original: Option<DateTime<Utc>>,
    pub rating: Option<i64>,
}

impl Picture {
    /// Create a picture row for `path` with no extracted fields set.
    ///
    /// `indexed_at` is clamped so that it is never earlier than the observed
    /// modification time.
    pub fn new(
        path: impl Into<String>,
        dirs: DirectoryComponents,
        file_modified_at: DateTime<Utc>,
        indexed_at: DateTime<Utc>,
    ) -> Self {
        let indexed_at = indexed_at.max(file_modified_at);
        Self {
            path: path.into(),
            dir: dirs.dir,
            dir1: dirs.dir1,
            dir2: dirs.dir2,
            dir3: dirs.dir3,
            components: dirs.components,
            file_modified_at,
            created_at: indexed_at,
            updated_at: indexed_at,
            make: None,
            model: None,
            date_time_original: None,
            rating: None,
        }
    }

    /// Whether a file with the given modification time needs re-indexing.
    ///
    /// A file is up to date only when it was modified strictly before this
    /// row was last indexed.
    pub fn is_stale(&self, file_modified_at: DateTime<Utc>) -> bool {
        file_modified_at >= self.updated_at
    }
}

/// A desired album membership, as returned by a grouping query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipPair {
    /// Album title on the remote service.
    pub album: String,
    /// Local picture path.
    pub path: String,
    /// Optional path to search for remotely instead of `path`.
    pub photoprism_path: Option<String>,
}

impl MembershipPair {
    /// Path used for the remote filename lookup.
    pub fn lookup_path(&self) -> &str {
        self.photoprism_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.path)
    }
}
