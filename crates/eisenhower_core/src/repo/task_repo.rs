//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/delete/load primitives over the durable `tasks` table.
//! - Keep SQL details and text encodings inside the persistence boundary.
//!
//! # Invariants
//! - Every operation opens a fresh connection and drops it before returning.
//! - Write paths call `Task::validate()` before any SQL mutation.
//! - `upsert` replaces every column of an existing row (last writer wins).
//! - `delete` of a missing id is a successful no-op.
//! - One malformed row never fails a bulk load; it is repaired or skipped and
//!   reported as a `MalformedRecord`.

use crate::db::{open_db, DbError};
use crate::model::dates::{format_date, format_timestamp, parse_date, parse_timestamp};
use crate::model::tags::TagSet;
use crate::model::task::{Level, Task, TaskId, TaskValidationError, DEFAULT_STATUS};
use log::{error, info, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    importance,
    urgency,
    due_date,
    created_at,
    updated_at,
    status,
    tags
FROM tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for task persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Record rejected before reaching storage.
    Validation(TaskValidationError),
    /// Backing file cannot be created or opened.
    Unavailable {
        path: PathBuf,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
    /// I/O or SQL failure while reading or writing.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Unavailable { path, source } => {
                write!(f, "task storage unavailable at `{}`: {source}", path.display())
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unavailable { source, .. } => Some(source.as_ref()),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Unavailable { path, source } => Self::Unavailable { path, source },
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// How a malformed stored row was handled during a bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Row kept with an empty tag set.
    EmptyTags,
    /// Row left out of the result.
    Skipped,
}

/// One stored row that could not be decoded as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// Raw `id` column text (may itself be the malformed value).
    pub row_id: String,
    pub column: &'static str,
    pub value: String,
    pub recovery: Recovery,
}

impl Display for MalformedRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let action = match self.recovery {
            Recovery::EmptyTags => "loaded with empty tags",
            Recovery::Skipped => "skipped",
        };
        write!(
            f,
            "malformed `{}` value `{}` in task `{}`; {action}",
            self.column, self.value, self.row_id
        )
    }
}

impl Error for MalformedRecord {}

/// Result of a bulk load, including per-record recoveries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    pub tasks: Vec<Task>,
    pub malformed: Vec<MalformedRecord>,
}

/// Repository interface for durable task storage.
///
/// No filtering, sorting or pagination happens at this layer.
pub trait TaskRepository {
    /// Creates the backing storage if absent and returns its location.
    fn ensure_initialized(&self) -> StoreResult<PathBuf>;
    /// Inserts a new record or fully replaces the one sharing `task.id`.
    fn upsert(&self, task: &Task) -> StoreResult<()>;
    /// Removes a record; missing ids are ignored.
    fn delete(&self, id: TaskId) -> StoreResult<()>;
    fn get(&self, id: TaskId) -> StoreResult<Option<Task>>;
    /// Loads every record and reports rows that needed recovery.
    fn load_all_detailed(&self) -> StoreResult<LoadOutcome>;

    /// Loads every record.
    fn load_all(&self) -> StoreResult<Vec<Task>> {
        Ok(self.load_all_detailed()?.tasks)
    }
}

/// SQLite-backed task store bound to one database file.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    path: PathBuf,
}

impl SqliteTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn connect(&self) -> StoreResult<Connection> {
        Ok(open_db(&self.path)?)
    }
}

impl TaskRepository for SqliteTaskStore {
    fn ensure_initialized(&self) -> StoreResult<PathBuf> {
        self.connect()?;
        Ok(self.path.clone())
    }

    fn upsert(&self, task: &Task) -> StoreResult<()> {
        task.validate()?;
        let started_at = Instant::now();
        let conn = self.connect()?;

        let result = conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                importance,
                urgency,
                due_date,
                created_at,
                updated_at,
                status,
                tags
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                importance = excluded.importance,
                urgency = excluded.urgency,
                due_date = excluded.due_date,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                status = excluded.status,
                tags = excluded.tags;",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.importance.as_str(),
                task.urgency.as_str(),
                task.due_date.map(format_date),
                format_timestamp(task.created_at),
                task.updated_at.map(format_timestamp),
                task.status.as_str(),
                task.tags.to_json(),
            ],
        );

        match result {
            Ok(_) => {
                info!(
                    "event=task_upsert module=store status=ok id={} duration_ms={}",
                    task.id,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=task_upsert module=store status=error id={} duration_ms={} error={}",
                    task.id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn delete(&self, id: TaskId) -> StoreResult<()> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        info!("event=task_delete module=store status=ok id={id} removed={removed}");
        Ok(())
    }

    fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return match decode_row(RawTaskRow::read(row)?) {
                Ok((task, _)) => Ok(Some(task)),
                Err(record) => {
                    warn!(
                        "event=task_get module=store status=malformed id={} column={}",
                        record.row_id, record.column
                    );
                    Ok(None)
                }
            };
        }
        Ok(None)
    }

    fn load_all_detailed(&self) -> StoreResult<LoadOutcome> {
        let started_at = Instant::now();
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut outcome = LoadOutcome::default();

        while let Some(row) = rows.next()? {
            match decode_row(RawTaskRow::read(row)?) {
                Ok((task, repaired)) => {
                    outcome.tasks.push(task);
                    outcome.malformed.extend(repaired);
                }
                Err(record) => outcome.malformed.push(record),
            }
        }

        for record in &outcome.malformed {
            warn!(
                "event=task_load module=store status=recovered id={} column={} recovery={:?}",
                record.row_id, record.column, record.recovery
            );
        }
        info!(
            "event=task_load module=store status=ok count={} malformed={} duration_ms={}",
            outcome.tasks.len(),
            outcome.malformed.len(),
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }
}

/// Column text as stored. `Err` carries a printable stand-in for a value
/// that is not valid UTF-8 text (for example a BLOB).
type StoredText = Result<Option<String>, String>;

/// Column values exactly as stored, before decoding.
struct RawTaskRow {
    id: StoredText,
    title: StoredText,
    description: StoredText,
    importance: StoredText,
    urgency: StoredText,
    due_date: StoredText,
    created_at: StoredText,
    updated_at: StoredText,
    status: StoredText,
    tags: StoredText,
}

impl RawTaskRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: read_text(row, "id")?,
            title: read_text(row, "title")?,
            description: read_text(row, "description")?,
            importance: read_text(row, "importance")?,
            urgency: read_text(row, "urgency")?,
            due_date: read_text(row, "due_date")?,
            created_at: read_text(row, "created_at")?,
            updated_at: read_text(row, "updated_at")?,
            status: read_text(row, "status")?,
            tags: read_text(row, "tags")?,
        })
    }
}

// SQLite does not enforce column types, so any storage class can show up.
fn read_text(row: &Row<'_>, column: &str) -> rusqlite::Result<StoredText> {
    Ok(match row.get_ref(column)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(value) => Ok(Some(value.to_string())),
        ValueRef::Real(value) => Ok(Some(value.to_string())),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Some(text.to_string()))
            .map_err(|_| String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Err(format!("<blob {} bytes>", bytes.len())),
    })
}

/// Decodes one stored row.
///
/// `Ok` carries an optional note about a repaired tag column; `Err` means the
/// row cannot be represented as a `Task` and must be skipped.
fn decode_row(raw: RawTaskRow) -> Result<(Task, Option<MalformedRecord>), MalformedRecord> {
    let row_id = match &raw.id {
        Ok(Some(id)) => id.clone(),
        Ok(None) => String::new(),
        Err(shown) => shown.clone(),
    };
    let row_id = row_id.as_str();

    let id_text = required_text(row_id, "id", raw.id)?;
    let id = Uuid::parse_str(&id_text)
        .ok()
        .filter(|id| !id.is_nil())
        .ok_or_else(|| skipped(row_id, "id", &id_text))?;
    let title = required_text(row_id, "title", raw.title)?;
    if title.trim().is_empty() {
        return Err(skipped(row_id, "title", &title));
    }
    let importance = decode_level(row_id, "importance", raw.importance)?;
    let urgency = decode_level(row_id, "urgency", raw.urgency)?;
    let description = optional_text(row_id, "description", raw.description)?;
    let due_date = match optional_text(row_id, "due_date", raw.due_date)?
        .filter(|value| !value.trim().is_empty())
    {
        None => None,
        Some(value) => Some(parse_date(&value).ok_or_else(|| skipped(row_id, "due_date", &value))?),
    };
    let created_at_text = required_text(row_id, "created_at", raw.created_at)?;
    let created_at = parse_timestamp(&created_at_text)
        .ok_or_else(|| skipped(row_id, "created_at", &created_at_text))?;
    let updated_at = match optional_text(row_id, "updated_at", raw.updated_at)?
        .filter(|value| !value.trim().is_empty())
    {
        None => None,
        Some(value) => {
            Some(parse_timestamp(&value).ok_or_else(|| skipped(row_id, "updated_at", &value))?)
        }
    };
    let status = optional_text(row_id, "status", raw.status)?
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    let (tags, repaired) = match raw.tags {
        Ok(None) => (TagSet::new(), None),
        Ok(Some(text)) if text.trim().is_empty() => (TagSet::new(), None),
        Ok(Some(text)) => match TagSet::from_json(&text) {
            Ok(tags) => (tags, None),
            Err(_) => (TagSet::new(), Some(emptied_tags(row_id, text))),
        },
        Err(shown) => (TagSet::new(), Some(emptied_tags(row_id, shown))),
    };

    let task = Task {
        id,
        title,
        description,
        importance,
        urgency,
        due_date,
        created_at,
        updated_at,
        status,
        tags,
    };
    Ok((task, repaired))
}

fn required_text(
    row_id: &str,
    column: &'static str,
    value: StoredText,
) -> Result<String, MalformedRecord> {
    match value {
        Ok(Some(text)) => Ok(text),
        Ok(None) => Err(skipped(row_id, column, "NULL")),
        Err(shown) => Err(skipped(row_id, column, &shown)),
    }
}

fn optional_text(
    row_id: &str,
    column: &'static str,
    value: StoredText,
) -> Result<Option<String>, MalformedRecord> {
    value.map_err(|shown| skipped(row_id, column, &shown))
}

fn decode_level(
    row_id: &str,
    column: &'static str,
    value: StoredText,
) -> Result<Level, MalformedRecord> {
    let text = required_text(row_id, column, value)?;
    text.parse().map_err(|_| skipped(row_id, column, &text))
}

fn skipped(row_id: &str, column: &'static str, value: &str) -> MalformedRecord {
    MalformedRecord {
        row_id: row_id.to_string(),
        column,
        value: value.to_string(),
        recovery: Recovery::Skipped,
    }
}

fn emptied_tags(row_id: &str, value: String) -> MalformedRecord {
    MalformedRecord {
        row_id: row_id.to_string(),
        column: "tags",
        value,
        recovery: Recovery::EmptyTags,
    }
}
