//! Raw SQL passthrough for diagnostics.
//!
//! Runs arbitrary SQL against the index. Every statement in the input is
//! executed in order; each yields either its result set rendered as strings
//! or the number of affected rows.

use std::fmt;

use picturedb_common::{Error, Result};
use rusqlite::{types::ValueRef, Batch, Connection, Statement};

/// Output of one statement run by [`run_statements`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutput {
    /// The statement produced a result set.
    Rows(RawTable),
    /// The statement produced no result set; number of rows changed.
    Affected(usize),
}

/// A result set with every value rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Run every statement in `sql`, returning one output per statement.
///
/// Statements run in order outside of any transaction, so the ones before a
/// failing statement keep their effect.
pub fn run_statements(conn: &Connection, sql: &str) -> Result<Vec<StatementOutput>> {
    let mut batch = Batch::new(conn, sql);
    let mut outputs = Vec::new();

    while let Some(mut stmt) = batch
        .next()
        .map_err(|e| Error::invalid_input(format!("invalid statement: {}", e)))?
    {
        outputs.push(run_one(&mut stmt)?);
    }

    if outputs.is_empty() {
        return Err(Error::invalid_input("no statement to run"));
    }

    Ok(outputs)
}

fn run_one(stmt: &mut Statement<'_>) -> Result<StatementOutput> {
    if stmt.column_count() == 0 {
        let affected = stmt
            .execute([])
            .map_err(|e| Error::database(e.to_string()))?;
        return Ok(StatementOutput::Affected(affected));
    }

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = stmt.query([]).map_err(|e| Error::database(e.to_string()))?;
    let mut table = RawTable {
        columns,
        rows: Vec::new(),
    };

    while let Some(row) = rows.next().map_err(|e| Error::database(e.to_string()))? {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            let value = row
                .get_ref(idx)
                .map_err(|e| Error::database(e.to_string()))?;
            values.push(render_value(value));
        }
        table.rows.push(values);
    }

    Ok(StatementOutput::Rows(table))
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

impl fmt::Display for RawTable {
    /// Column-aligned text: header, a dashed rule, then one line per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(value.chars().count());
            }
        }

        let write_line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())
        };

        write_line(f, &self.columns)?;
        let rules: Vec<String> = self
            .columns
            .iter()
            .map(|c| "-".repeat(c.chars().count()))
            .collect();
        write_line(f, &rules)?;
        for row in &self.rows {
            write_line(f, row)?;
        }

        Ok(())
    }
}
