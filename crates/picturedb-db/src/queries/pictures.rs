//! Picture and tag query operations.
//!
//! Pictures are keyed by path. Saving a picture upserts its row and replaces
//! its tag set in one transaction; deleting it cascades to its tags.

use std::collections::BTreeSet;
use std::path::MAIN_SEPARATOR;

use chrono::{DateTime, SecondsFormat, Utc};
use picturedb_common::{Error, Result};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

use crate::models::Picture;

const PICTURE_COLUMNS: &str = "path, dir, dir1, dir2, dir3, components, file_modified_at, \
     created_at, updated_at, make, model, date_time_original, rating";

/// Format a timestamp the way every timestamp column stores it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_picture(row: &Row) -> rusqlite::Result<Picture> {
    let components: String = row.get(5)?;
    let date_time_original: Option<String> = row.get(11)?;

    Ok(Picture {
        path: row.get(0)?,
        dir: row.get(1)?,
        dir1: row.get(2)?,
        dir2: row.get(3)?,
        dir3: row.get(4)?,
        components: serde_json::from_str(&components)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        file_modified_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
        created_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
        updated_at: parse_timestamp(8, &row.get::<_, String>(8)?)?,
        make: row.get(9)?,
        model: row.get(10)?,
        date_time_original: date_time_original
            .map(|s| parse_timestamp(11, &s))
            .transpose()?,
        rating: row.get(12)?,
    })
}

/// Get a picture by path.
pub fn get_picture(conn: &Connection, path: &str) -> Result<Option<Picture>> {
    conn.query_row(
        &format!("SELECT {} FROM pictures WHERE path = ?", PICTURE_COLUMNS),
        [path],
        row_to_picture,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Insert or update a picture and replace its tags.
///
/// The row and the tag set are written in a single transaction. `created_at`
/// of an existing row is preserved; every other column is overwritten, so
/// fields missing from `picture` are cleared. Existing tags that are not in
/// `tags` are removed, an empty set removes them all.
pub fn save_picture(conn: &Connection, picture: &Picture, tags: &BTreeSet<String>) -> Result<()> {
    let components =
        serde_json::to_string(&picture.components).map_err(|e| Error::internal(e.to_string()))?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    tx.execute(
        &format!(
            "INSERT INTO pictures ({})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(path) DO UPDATE SET
                dir = excluded.dir,
                dir1 = excluded.dir1,
                dir2 = excluded.dir2,
                dir3 = excluded.dir3,
                components = excluded.components,
                file_modified_at = excluded.file_modified_at,
                updated_at = excluded.updated_at,
                make = excluded.make,
                model = excluded.model,
                date_time_original = excluded.date_time_original,
                rating = excluded.rating",
            PICTURE_COLUMNS
        ),
        params![
            picture.path,
            picture.dir,
            picture.dir1,
            picture.dir2,
            picture.dir3,
            components,
            format_timestamp(&picture.file_modified_at),
            format_timestamp(&picture.created_at),
            format_timestamp(&picture.updated_at),
            picture.make,
            picture.model,
            picture.date_time_original.as_ref().map(format_timestamp),
            picture.rating,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    tx.execute("DELETE FROM picture_tags WHERE path = ?", [&picture.path])
        .map_err(|e| Error::database(e.to_string()))?;

    {
        let mut stmt = tx
            .prepare("INSERT INTO picture_tags (path, tag) VALUES (?, ?)")
            .map_err(|e| Error::database(e.to_string()))?;
        for tag in tags {
            stmt.execute(params![picture.path, tag])
                .map_err(|e| Error::database(e.to_string()))?;
        }
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))
}

/// Get the tags of a picture, sorted.
pub fn get_tags(conn: &Connection, path: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT tag FROM picture_tags WHERE path = ? ORDER BY tag")
        .map_err(|e| Error::database(e.to_string()))?;

    let tags = stmt
        .query_map([path], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(tags)
}

/// List the paths of all pictures stored under `root`.
///
/// The match is an exact, case-sensitive prefix on whole path segments:
/// `photos` covers `photos/a.jpg` but not `photos2/a.jpg`. The root `.`
/// covers every relative path that does not climb out of the working
/// directory.
pub fn list_paths_under(conn: &Connection, root: &str) -> Result<Vec<String>> {
    let (sql, param) = if root == "." {
        (
            "SELECT path FROM pictures
             WHERE path NOT GLOB '/*' AND path NOT GLOB '../*' AND path != '..'
             ORDER BY path",
            None,
        )
    } else {
        let prefix = if root.ends_with(MAIN_SEPARATOR) || root.ends_with('/') {
            root.to_string()
        } else {
            format!("{}{}", root, MAIN_SEPARATOR)
        };
        (
            "SELECT path FROM pictures WHERE substr(path, 1, length(?1)) = ?1 ORDER BY path",
            Some(prefix),
        )
    };

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let path_of = |row: &Row| row.get::<_, String>(0);
    let rows = match &param {
        Some(prefix) => stmt.query_map([prefix], path_of),
        None => stmt.query_map([], path_of),
    }
    .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Delete a picture by path. Its tags are removed by the cascade.
pub fn delete_picture(conn: &Connection, path: &str) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM pictures WHERE path = ?", [path])
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(affected > 0)
}

/// Count all indexed pictures.
pub fn count_pictures(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM pictures", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
