//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Create the destination directory for file databases.
//! - Apply and verify the task schema before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have the `tasks` table with every required column.
//! - Directory or file creation failures map to `DbError::Unavailable`.

use super::schema::{apply_schema, ensure_schema_ready};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens (creating if needed) a SQLite database file with the task schema.
///
/// # Side effects
/// - Creates missing parent directories.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_dir_create_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(DbError::Unavailable {
                path: path.to_path_buf(),
                source: Box::new(err),
            });
        }
    }

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(DbError::Unavailable {
                path: path.to_path_buf(),
                source: Box::new(err),
            });
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(unavailable_if_cannot_open(path, err))
        }
    }
}

/// Opens an in-memory SQLite database with the task schema applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_schema(conn)?;
    ensure_schema_ready(conn)?;
    Ok(())
}

// SQLite opens lazily, so an unopenable file (a directory, a read-only
// location) often only fails on the first statement.
fn unavailable_if_cannot_open(path: &Path, err: DbError) -> DbError {
    match err {
        DbError::Sqlite(inner)
            if matches!(
                inner.sqlite_error_code(),
                Some(ErrorCode::CannotOpen | ErrorCode::ReadOnly | ErrorCode::NotADatabase)
            ) =>
        {
            DbError::Unavailable {
                path: path.to_path_buf(),
                source: Box::new(inner),
            }
        }
        other => other,
    }
}
