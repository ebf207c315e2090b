//! Schema migrations for the picture index.
//!
//! Each migration is an SQL file compiled into the binary. Applied versions
//! are recorded in `schema_migrations`; opening an index applies whatever is
//! newer than the highest recorded version.

use rusqlite::{params, Connection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to read schema version: {0}")]
    Version(#[source] rusqlite::Error),

    #[error("Migration {version} ({name}) failed: {source}")]
    Failed {
        version: u32,
        name: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial",
    sql: include_str!("001_initial.sql"),
}];

/// Highest applied version, 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> Result<u32, MigrationError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(MigrationError::Version)?;

    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .map_err(MigrationError::Version)?;

    Ok(version.unwrap_or(0))
}

/// Apply pending migrations, one transaction each. Returns how many ran.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    let current = schema_version(conn)?;

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration).map_err(|source| MigrationError::Failed {
            version: migration.version,
            name: migration.name,
            source,
        })?;

        tracing::info!("Applied migration {}: {}", migration.version, migration.name);
        applied += 1;
    }

    Ok(applied)
}

fn apply(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
        params![migration.version, migration.name],
    )?;
    tx.commit()
}
