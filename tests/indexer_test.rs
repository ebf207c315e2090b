//! Incremental indexer integration tests
//!
//! Runs the indexer over temporary directory trees with a fake extractor.

mod common;

use common::{metadata, set_mtime, write_picture, FakeExtractor};
use picturedb::indexer::Indexer;
use picturedb_common::paths::path_key;
use picturedb_db::pool::{init_memory_pool, DbPool};
use picturedb_db::queries::pictures;
use picturedb_exif::ExtractedMetadata;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Fixture {
    dir: TempDir,
    pool: DbPool,
    extractor: FakeExtractor,
    indexer: Indexer,
}

impl Fixture {
    fn new() -> Self {
        let pool = init_memory_pool().unwrap();
        let extractor = FakeExtractor::new();
        let indexer = Indexer::new(pool.clone(), extractor.clone());
        Self {
            dir: tempdir().unwrap(),
            pool,
            extractor,
            indexer,
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a picture an hour in the past so it is clearly older than any index run.
    fn picture(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        write_picture(&path);
        set_mtime(&path, -3600);
        path
    }

    fn tags(&self, path: &Path) -> Vec<String> {
        let conn = self.pool.get().unwrap();
        pictures::get_tags(&conn, &path_key(path)).unwrap()
    }

    fn is_indexed(&self, path: &Path) -> bool {
        let conn = self.pool.get().unwrap();
        pictures::get_picture(&conn, &path_key(path))
            .unwrap()
            .is_some()
    }

    fn count(&self) -> i64 {
        let conn = self.pool.get().unwrap();
        pictures::count_pictures(&conn).unwrap()
    }
}

#[test]
fn test_index_new_tree() {
    let fx = Fixture::new();
    let a = fx.picture("2020/summer/a.jpg");
    fx.picture("2020/b.heic");
    fx.picture("c.JPG");
    std::fs::write(fx.root().join("notes.txt"), b"").unwrap();
    fx.extractor.set(&a, metadata(&["beach", "family"], Some(5)));

    let report = fx.indexer.reindex(fx.root(), false).unwrap();

    assert_eq!(report.candidates, 3);
    assert_eq!(report.processed, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.removed, 0);
    assert!(report.failures.is_empty());
    assert_eq!(fx.count(), 3);
    assert_eq!(fx.tags(&a), vec!["beach", "family"]);

    let conn = fx.pool.get().unwrap();
    let picture = pictures::get_picture(&conn, &path_key(&a)).unwrap().unwrap();
    assert_eq!(picture.rating, Some(5));
    assert_eq!(picture.dir, path_key(&fx.root().join("2020/summer")));
    assert!(picture.updated_at >= picture.file_modified_at);
}

#[test]
fn test_absent_fields_stored_as_null() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");

    fx.indexer.reindex(fx.root(), false).unwrap();

    let conn = fx.pool.get().unwrap();
    let picture = pictures::get_picture(&conn, &path_key(&a)).unwrap().unwrap();
    assert_eq!(picture.make, None);
    assert_eq!(picture.model, None);
    assert_eq!(picture.rating, None);
    assert_eq!(picture.date_time_original, None);
    assert!(fx.tags(&a).is_empty());
}

#[test]
fn test_second_run_extracts_nothing() {
    let fx = Fixture::new();
    fx.picture("a.jpg");
    fx.picture("sub/b.jpg");

    fx.indexer.reindex(fx.root(), false).unwrap();
    assert_eq!(fx.extractor.calls(), 2);

    let report = fx.indexer.reindex(fx.root(), false).unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.removed, 0);
    assert_eq!(fx.extractor.calls(), 2);
    assert_eq!(fx.count(), 2);
}

#[test]
fn test_modified_file_is_reextracted() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");
    let b = fx.picture("b.jpg");

    fx.indexer.reindex(fx.root(), false).unwrap();
    set_mtime(&b, 3600);

    let report = fx.indexer.reindex(fx.root(), false).unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(fx.extractor.extracted().last(), Some(&b));
    assert!(!fx.extractor.extracted()[2..].contains(&a));
}

#[test]
fn test_force_reextracts_everything() {
    let fx = Fixture::new();
    fx.picture("a.jpg");
    fx.picture("b.jpg");

    fx.indexer.reindex(fx.root(), false).unwrap();
    let report = fx.indexer.reindex(fx.root(), true).unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(fx.extractor.calls(), 4);
}

#[test]
fn test_deleted_file_is_purged() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");
    let b = fx.picture("sub/b.jpg");
    fx.extractor.set(&b, metadata(&["gone"], None));

    fx.indexer.reindex(fx.root(), false).unwrap();
    std::fs::remove_file(&b).unwrap();

    let report = fx.indexer.reindex(fx.root(), false).unwrap();
    assert_eq!(report.removed, 1);
    assert!(fx.is_indexed(&a));
    assert!(!fx.is_indexed(&b));
    assert!(fx.tags(&b).is_empty());
}

#[test]
fn test_empty_root_purges_everything_under_it() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");
    let b = fx.picture("sub/b.jpg");

    fx.indexer.reindex(fx.root(), false).unwrap();
    std::fs::remove_file(&a).unwrap();
    std::fs::remove_file(&b).unwrap();

    let report = fx.indexer.reindex(fx.root(), false).unwrap();
    assert_eq!(report.candidates, 0);
    assert_eq!(report.removed, 2);
    assert_eq!(fx.count(), 0);
}

#[test]
fn test_purge_leaves_other_roots_alone() {
    let fx = Fixture::new();
    let photos = fx.root().join("photos");
    let sibling = fx.root().join("photos2");
    let a = fx.picture("photos/a.jpg");
    let b = fx.picture("photos2/b.jpg");

    fx.indexer.reindex(&photos, false).unwrap();
    fx.indexer.reindex(&sibling, false).unwrap();
    assert_eq!(fx.count(), 2);

    std::fs::remove_file(&a).unwrap();
    let report = fx.indexer.reindex(&photos, false).unwrap();

    assert_eq!(report.removed, 1);
    assert!(fx.is_indexed(&b));
}

#[test]
fn test_tags_replaced_wholesale() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");
    fx.extractor.set(&a, metadata(&["a", "b"], None));
    fx.indexer.reindex(fx.root(), false).unwrap();
    assert_eq!(fx.tags(&a), vec!["a", "b"]);

    fx.extractor.set(&a, metadata(&["c"], None));
    fx.indexer.reindex(fx.root(), true).unwrap();
    assert_eq!(fx.tags(&a), vec!["c"]);

    fx.extractor.set(&a, ExtractedMetadata::default());
    fx.indexer.reindex(fx.root(), true).unwrap();
    assert!(fx.tags(&a).is_empty());
}

#[test]
fn test_failed_extraction_keeps_previous_record() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");
    fx.extractor.set(&a, metadata(&["keep"], Some(3)));
    fx.indexer.reindex(fx.root(), false).unwrap();

    fx.extractor.fail(&a);
    let report = fx.indexer.reindex(fx.root(), true).unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.removed, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, a);
    assert!(report.failures[0].message.contains("corrupt"));

    let conn = fx.pool.get().unwrap();
    let picture = pictures::get_picture(&conn, &path_key(&a)).unwrap().unwrap();
    assert_eq!(picture.rating, Some(3));
    assert_eq!(fx.tags(&a), vec!["keep"]);
}

#[test]
fn test_failed_extraction_does_not_stop_run() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");
    let b = fx.picture("b.jpg");
    fx.extractor.fail(&a);

    let report = fx.indexer.reindex(fx.root(), false).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(!fx.is_indexed(&a));
    assert!(fx.is_indexed(&b));
}

#[cfg(unix)]
#[test]
fn test_unreadable_candidate_keeps_previous_record() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");
    let b = fx.picture("b.jpg");
    fx.extractor.set(&a, metadata(&["keep"], Some(2)));
    fx.indexer.reindex(fx.root(), false).unwrap();

    // A dangling link is still listed by the walk but cannot be stat'ed
    std::fs::remove_file(&a).unwrap();
    std::os::unix::fs::symlink(fx.root().join("nowhere.jpg"), &a).unwrap();

    let report = fx.indexer.reindex(fx.root(), true).unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.processed, 1);
    assert_eq!(report.removed, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, a);
    assert_eq!(fx.extractor.calls(), 3);
    assert!(fx.is_indexed(&a));
    assert!(fx.is_indexed(&b));
    assert_eq!(fx.tags(&a), vec!["keep"]);
}

#[test]
fn test_missing_root_is_an_error() {
    let fx = Fixture::new();
    assert!(fx
        .indexer
        .reindex(&fx.root().join("missing"), false)
        .is_err());
}

#[test]
fn test_created_at_survives_reindex() {
    let fx = Fixture::new();
    let a = fx.picture("a.jpg");

    fx.indexer.reindex(fx.root(), false).unwrap();
    let conn = fx.pool.get().unwrap();
    let first = pictures::get_picture(&conn, &path_key(&a)).unwrap().unwrap();
    drop(conn);

    fx.indexer.reindex(fx.root(), true).unwrap();
    let conn = fx.pool.get().unwrap();
    let second = pictures::get_picture(&conn, &path_key(&a)).unwrap().unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
}
