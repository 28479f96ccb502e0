//! SQLite storage bootstrap for the task table.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the task store.
//! - Create the fixed `tasks` schema idempotently on every open.
//!
//! # Invariants
//! - Core code must not read/write task data before the schema check passes.
//! - A destination that cannot be created or opened surfaces as
//!   `DbError::Unavailable`, never as a generic SQLite error.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Backing file or its directory cannot be created/opened.
    Unavailable {
        path: PathBuf,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
    Sqlite(rusqlite::Error),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { path, source } => {
                write!(f, "task storage unavailable at `{}`: {source}", path.display())
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable { source, .. } => Some(source.as_ref()),
            Self::Sqlite(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
