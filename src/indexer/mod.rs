//! Incremental picture indexing.
//!
//! An [`Indexer`] brings the index in line with one directory tree: new and
//! modified pictures are extracted and upserted, unchanged ones are skipped,
//! and records for files that disappeared from the tree are purged.

pub mod scanner;

use anyhow::Result;
use chrono::{DateTime, Utc};
use picturedb_common::paths::{normalize_path, path_key};
use picturedb_common::DirectoryComponents;
use picturedb_db::{
    models::Picture,
    pool::{get_conn, DbPool, PooledConnection},
    queries::pictures,
};
use picturedb_exif::MetadataExtractor;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use scanner::scan_pictures;

/// Indexes directory trees into the picture database.
pub struct Indexer {
    pool: DbPool,
    extractor: Box<dyn MetadataExtractor>,
}

/// Summary of one [`Indexer::reindex`] run.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    /// Picture files found under the root.
    pub candidates: usize,
    /// Files extracted and written.
    pub processed: usize,
    /// Files whose record was already up to date.
    pub skipped: usize,
    /// Records purged because their file no longer exists.
    pub removed: usize,
    pub failures: Vec<IndexFailure>,
}

/// A file that could not be indexed. Its previous record, if any, is kept.
#[derive(Debug, Clone)]
pub struct IndexFailure {
    pub path: PathBuf,
    pub message: String,
}

enum FileOutcome {
    Processed,
    Skipped,
    Failed(String),
}

impl Indexer {
    /// Create an indexer writing to `pool` and reading metadata with `extractor`.
    pub fn new(pool: DbPool, extractor: impl MetadataExtractor + 'static) -> Self {
        Self {
            pool,
            extractor: Box::new(extractor),
        }
    }

    /// Bring the index in line with the tree under `root`.
    ///
    /// With `force` set every picture is re-extracted regardless of its
    /// modification time. Extraction failures are collected in the report;
    /// walk and storage errors abort the run.
    pub fn reindex(&self, root: &Path, force: bool) -> Result<IndexReport> {
        let root = normalize_path(root);
        info!("Indexing {:?}", root);

        let candidates = scan_pictures(&root)?;
        let conn = get_conn(&self.pool)?;

        let mut ordered: Vec<&PathBuf> = candidates.iter().collect();
        ordered.sort();

        let total = ordered.len();
        let mut report = IndexReport {
            candidates: total,
            ..Default::default()
        };

        for (idx, path) in ordered.into_iter().enumerate() {
            let percent = (idx + 1) * 100 / total;
            match self.index_file(&conn, path, force, percent)? {
                FileOutcome::Processed => report.processed += 1,
                FileOutcome::Skipped => report.skipped += 1,
                FileOutcome::Failed(message) => {
                    warn!("Failed to index {:?}: {}", path, message);
                    report.failures.push(IndexFailure {
                        path: path.clone(),
                        message,
                    });
                }
            }
        }

        report.removed = purge_missing(&conn, &root, &candidates)?;

        info!(
            "Indexed {:?}: {} found, {} processed, {} skipped, {} removed, {} failed",
            root,
            report.candidates,
            report.processed,
            report.skipped,
            report.removed,
            report.failures.len()
        );
        Ok(report)
    }

    fn index_file(
        &self,
        conn: &PooledConnection,
        path: &Path,
        force: bool,
        percent: usize,
    ) -> Result<FileOutcome> {
        let key = path_key(path);

        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(e) => return Ok(FileOutcome::Failed(e.to_string())),
        };

        let existing = pictures::get_picture(conn, &key)?;
        if let Some(ref picture) = existing {
            if !force && !picture.is_stale(modified) {
                debug!("[{:>3}%] skipping {}", percent, key);
                return Ok(FileOutcome::Skipped);
            }
        }

        info!("[{:>3}%] indexing {}", percent, key);

        let metadata = match self.extractor.extract(path) {
            Ok(metadata) => metadata,
            Err(e) => return Ok(FileOutcome::Failed(e.to_string())),
        };

        let mut picture = Picture::new(
            key,
            DirectoryComponents::from_path(path),
            modified,
            Utc::now(),
        );
        if let Some(existing) = existing {
            picture.created_at = existing.created_at;
        }
        picture.make = metadata.make;
        picture.model = metadata.model;
        picture.date_time_original = metadata.captured_at;
        picture.rating = metadata.rating;

        pictures::save_picture(conn, &picture, &metadata.keywords)?;
        Ok(FileOutcome::Processed)
    }
}

/// Delete records under `root` whose file was not found by the scan.
fn purge_missing(
    conn: &PooledConnection,
    root: &Path,
    candidates: &HashSet<PathBuf>,
) -> Result<usize> {
    let present: HashSet<String> = candidates.iter().map(|p| path_key(p)).collect();

    let mut removed = 0;
    for path in pictures::list_paths_under(conn, &path_key(root))? {
        if present.contains(&path) {
            continue;
        }

        info!("Removing {} from index", path);
        if pictures::delete_picture(conn, &path)? {
            removed += 1;
        }
    }

    Ok(removed)
}
