//! Grouping queries that decide which pictures belong to which album.
//!
//! A [`GroupingQuery`] yields ordered [`MembershipPair`]s. Besides the
//! built-in groupings (by tag prefix or by directory level) callers may pass
//! a read-only SQL statement that selects `album` and `path` columns and
//! optionally a `photoprism_path` column.

use picturedb_common::{Error, Result};
use rusqlite::{Batch, Connection};

use crate::models::MembershipPair;

/// How to compute the desired album memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupingQuery {
    /// A read-only SQL statement returning `album`, `path` and optionally
    /// `photoprism_path` columns.
    Sql(String),
    /// One album per tag starting with the prefix; the album title is the
    /// tag with the prefix removed.
    TagPrefix(String),
    /// One album per value of `dir1`, `dir2` or `dir3`.
    Directory(u8),
}

/// Run a grouping query, returning pairs in query order.
pub fn membership_pairs(conn: &Connection, query: &GroupingQuery) -> Result<Vec<MembershipPair>> {
    match query {
        GroupingQuery::Sql(sql) => sql_pairs(conn, sql),
        GroupingQuery::TagPrefix(prefix) => tag_prefix_pairs(conn, prefix),
        GroupingQuery::Directory(level) => directory_pairs(conn, *level),
    }
}

fn tag_prefix_pairs(conn: &Connection, prefix: &str) -> Result<Vec<MembershipPair>> {
    if prefix.is_empty() {
        return Err(Error::invalid_input("tag prefix must not be empty"));
    }

    sql_pairs(
        conn,
        &format!(
            "SELECT substr(tag, length({p}) + 1) AS album, path
             FROM picture_tags
             WHERE substr(tag, 1, length({p})) = {p} AND length(tag) > length({p})
             ORDER BY album, path",
            p = quote_literal(prefix)
        ),
    )
}

fn directory_pairs(conn: &Connection, level: u8) -> Result<Vec<MembershipPair>> {
    let column = match level {
        1 => "dir1",
        2 => "dir2",
        3 => "dir3",
        other => {
            return Err(Error::invalid_input(format!(
                "directory level must be 1, 2 or 3, got {}",
                other
            )))
        }
    };

    sql_pairs(
        conn,
        &format!(
            "SELECT {c} AS album, path FROM pictures WHERE {c} IS NOT NULL ORDER BY album, path",
            c = column
        ),
    )
}

fn sql_pairs(conn: &Connection, sql: &str) -> Result<Vec<MembershipPair>> {
    let invalid =
        |e: rusqlite::Error| Error::invalid_input(format!("invalid grouping query: {}", e));

    let mut batch = Batch::new(conn, sql);
    let mut stmt = batch
        .next()
        .map_err(invalid)?
        .ok_or_else(|| Error::invalid_input("grouping query is empty"))?;
    if batch.next().map_err(invalid)?.is_some() {
        return Err(Error::invalid_input("grouping query must be a single statement"));
    }

    if !stmt.readonly() {
        return Err(Error::invalid_input(
            "grouping query must be a read-only statement",
        ));
    }

    let column = |name: &str| {
        stmt.column_names()
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    };
    let album_idx = column("album")
        .ok_or_else(|| Error::invalid_input("grouping query must return an `album` column"))?;
    let path_idx = column("path")
        .ok_or_else(|| Error::invalid_input("grouping query must return a `path` column"))?;
    let override_idx = column("photoprism_path");

    let rows = stmt
        .query_map([], |row| {
            let album: Option<String> = row.get(album_idx)?;
            let path: Option<String> = row.get(path_idx)?;
            let photoprism_path: Option<String> = match override_idx {
                Some(idx) => row.get(idx)?,
                None => None,
            };
            Ok((album, path, photoprism_path))
        })
        .map_err(|e| Error::database(e.to_string()))?;

    let mut pairs = Vec::new();
    for row in rows {
        match row.map_err(|e| Error::database(e.to_string()))? {
            (Some(album), Some(path), photoprism_path) => pairs.push(MembershipPair {
                album,
                path,
                photoprism_path,
            }),
            (album, path, _) => {
                tracing::warn!(
                    "Skipping grouping row with NULL album or path (album: {:?}, path: {:?})",
                    album,
                    path
                );
            }
        }
    }

    Ok(pairs)
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
