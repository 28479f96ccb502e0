//! Fixed schema for the `tasks` table.
//!
//! # Invariants
//! - Schema creation is idempotent (`CREATE TABLE IF NOT EXISTS`).
//! - An existing table must expose every column in [`TASK_COLUMNS`]; extra
//!   columns are tolerated.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub const TASKS_TABLE: &str = "tasks";

/// Column order shared by SQL statements and tabular exports.
pub const TASK_COLUMNS: [&str; 10] = [
    "id",
    "title",
    "description",
    "importance",
    "urgency",
    "due_date",
    "created_at",
    "updated_at",
    "status",
    "tags",
];

/// Creates the task table when absent.
pub fn apply_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Verifies that the connection exposes the table shape the store relies on.
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    if !table_exists(conn, TASKS_TABLE)? {
        return Err(DbError::MissingRequiredTable(TASKS_TABLE));
    }

    for column in TASK_COLUMNS {
        if !table_has_column(conn, TASKS_TABLE, column)? {
            return Err(DbError::MissingRequiredColumn {
                table: TASKS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
