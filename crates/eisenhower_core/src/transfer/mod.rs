//! Bulk import/export of tasks as CSV and XLSX.
//!
//! # Responsibility
//! - Map tasks 1:1 onto the table columns, in schema order.
//! - Decode hand-edited rows leniently and persist them through the store.
//!
//! # Invariants
//! - Exports replace the destination file atomically (temp file + rename).
//! - Without `overwrite`, a row whose id already exists in the store is
//!   skipped and the stored record stays untouched.
//! - A malformed row is rejected on its own; only I/O and store failures
//!   abort the whole import.

use crate::db::schema::TASK_COLUMNS;
use crate::model::dates::{format_date, format_timestamp, parse_date_lenient, parse_timestamp};
use crate::model::tags::TagSet;
use crate::model::task::{Level, Task, TaskId, TaskValidationError, DEFAULT_STATUS};
use crate::repo::task_repo::{StoreError, TaskRepository};
use chrono::Utc;
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

mod csv_file;
mod xlsx_file;

pub use csv_file::{export_csv, import_csv};
pub use xlsx_file::{export_xlsx, import_xlsx};

/// Error for import/export operations.
#[derive(Debug)]
pub enum TransferError {
    Io(std::io::Error),
    Csv(csv::Error),
    XlsxWrite(rust_xlsxwriter::XlsxError),
    XlsxRead(calamine::XlsxError),
    /// Workbook contains no worksheet.
    EmptyWorkbook,
    /// Header row lacks a column the importer needs.
    MissingColumn(&'static str),
    Store(StoreError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::XlsxWrite(err) => write!(f, "{err}"),
            Self::XlsxRead(err) => write!(f, "{err}"),
            Self::EmptyWorkbook => write!(f, "workbook has no worksheet"),
            Self::MissingColumn(column) => write!(f, "header row is missing column `{column}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::XlsxWrite(err) => Some(err),
            Self::XlsxRead(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::EmptyWorkbook | Self::MissingColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for TransferError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<rust_xlsxwriter::XlsxError> for TransferError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::XlsxWrite(value)
    }
}

impl From<calamine::XlsxError> for TransferError {
    fn from(value: calamine::XlsxError) -> Self {
        Self::XlsxRead(value)
    }
}

impl From<StoreError> for TransferError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Import behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Replace stored tasks that share an id with an imported row.
    pub overwrite: bool,
}

/// Why a single row was not imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    Validation(TaskValidationError),
    InvalidField { column: &'static str, value: String },
}

/// One rejected input row; `line` is 1-based and counts the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    pub line: usize,
    pub issue: RowIssue,
}

impl Display for RowRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.issue {
            RowIssue::Validation(err) => write!(f, "line {}: {err}", self.line),
            RowIssue::InvalidField { column, value } => {
                write!(f, "line {}: invalid {column} `{value}`", self.line)
            }
        }
    }
}

/// Per-row outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<TaskId>,
    pub skipped_duplicates: Vec<TaskId>,
    pub rejected: Vec<RowRejection>,
}

/// Cell values of one input row, keyed by lowercase header name.
pub(crate) type RowFields = HashMap<String, String>;

/// Flattens a task into cells in [`TASK_COLUMNS`] order.
pub(crate) fn task_to_cells(task: &Task) -> [String; 10] {
    [
        task.id.to_string(),
        task.title.clone(),
        task.description.clone().unwrap_or_default(),
        task.importance.as_str().to_string(),
        task.urgency.as_str().to_string(),
        task.due_date.map(format_date).unwrap_or_default(),
        format_timestamp(task.created_at),
        task.updated_at.map(format_timestamp).unwrap_or_default(),
        task.status.clone(),
        task.tags.to_json(),
    ]
}

/// Zips a header row with a data row.
pub(crate) fn row_fields<'a>(
    headers: &[String],
    cells: impl IntoIterator<Item = &'a str>,
) -> RowFields {
    headers
        .iter()
        .cloned()
        .zip(cells.into_iter().map(str::to_string))
        .collect()
}

pub(crate) fn normalize_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    headers
        .into_iter()
        .map(|name| name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect()
}

pub(crate) fn require_title_column(headers: &[String]) -> Result<(), TransferError> {
    if headers.iter().any(|name| name == "title") {
        Ok(())
    } else {
        Err(TransferError::MissingColumn("title"))
    }
}

/// Builds a task from one row, filling defaults for blank cells.
pub(crate) fn decode_fields(fields: &RowFields) -> Result<Task, RowIssue> {
    let cell = |column: &str| {
        fields
            .get(column)
            .map(|value| value.trim())
            .unwrap_or_default()
    };
    let invalid = |column: &'static str, value: &str| RowIssue::InvalidField {
        column,
        value: value.to_string(),
    };

    let title = cell("title");
    if title.is_empty() {
        return Err(RowIssue::Validation(TaskValidationError::EmptyTitle));
    }

    let mut task = match cell("id") {
        "" => Task::new(title),
        raw => {
            let id = Uuid::parse_str(raw).map_err(|_| invalid("id", raw))?;
            Task::with_id(id, title).map_err(RowIssue::Validation)?
        }
    };

    let description = fields.get("description").map(String::as_str).unwrap_or("");
    task.description = if description.trim().is_empty() {
        None
    } else {
        Some(description.to_string())
    };
    task.importance = parse_level(cell("importance")).map_err(|_| {
        invalid("importance", cell("importance"))
    })?;
    task.urgency = parse_level(cell("urgency")).map_err(|_| invalid("urgency", cell("urgency")))?;
    task.due_date = match cell("due_date") {
        "" => None,
        raw => Some(parse_date_lenient(raw).ok_or_else(|| invalid("due_date", raw))?),
    };
    task.created_at = match cell("created_at") {
        "" => Utc::now(),
        raw => parse_timestamp(raw).ok_or_else(|| invalid("created_at", raw))?,
    };
    task.updated_at = match cell("updated_at") {
        "" => None,
        raw => Some(parse_timestamp(raw).ok_or_else(|| invalid("updated_at", raw))?),
    };
    task.status = match cell("status") {
        "" => DEFAULT_STATUS.to_string(),
        raw => raw.to_string(),
    };
    task.tags = TagSet::parse_lenient(cell("tags"));

    Ok(task)
}

fn parse_level(value: &str) -> Result<Level, crate::model::task::ParseLevelError> {
    if value.is_empty() {
        Ok(Level::default())
    } else {
        value.parse()
    }
}

/// Persists decoded rows through `repo`, honoring the duplicate policy.
pub(crate) fn import_rows<R: TaskRepository>(
    rows: impl IntoIterator<Item = (usize, Result<RowFields, RowIssue>)>,
    repo: &R,
    options: ImportOptions,
) -> Result<ImportReport, TransferError> {
    let mut report = ImportReport::default();

    for (line, fields) in rows {
        if let Ok(fields) = &fields {
            if fields.values().all(|value| value.trim().is_empty()) {
                continue;
            }
        }

        let task = match fields.and_then(|fields| decode_fields(&fields)) {
            Ok(task) => task,
            Err(issue) => {
                let rejection = RowRejection { line, issue };
                warn!("event=task_import module=transfer status=rejected detail={rejection}");
                report.rejected.push(rejection);
                continue;
            }
        };

        if !options.overwrite && repo.get(task.id)?.is_some() {
            report.skipped_duplicates.push(task.id);
            continue;
        }

        repo.upsert(&task)?;
        report.imported.push(task.id);
    }

    info!(
        "event=task_import module=transfer status=ok imported={} skipped={} rejected={} overwrite={}",
        report.imported.len(),
        report.skipped_duplicates.len(),
        report.rejected.len(),
        options.overwrite
    );
    Ok(report)
}

/// Header row for exports.
pub(crate) fn header_cells() -> [&'static str; 10] {
    TASK_COLUMNS
}

/// Writes `bytes` to a uniquely named temp file next to `path`, then renames
/// it into place. The temp file is removed if anything fails before the
/// rename completes.
pub(crate) fn write_atomic_bytes(path: &Path, bytes: &[u8]) -> Result<(), TransferError> {
    let parent = match path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => dir,
        None => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| TransferError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_fields, write_atomic_bytes, RowFields, RowIssue};
    use crate::model::task::{Level, TaskValidationError};
    use chrono::NaiveDate;

    fn fields(pairs: &[(&str, &str)]) -> RowFields {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn blank_cells_fall_back_to_defaults() {
        let task = decode_fields(&fields(&[("title", "  Plan sprint  ")])).unwrap();
        assert_eq!(task.title, "Plan sprint");
        assert_eq!(task.importance, Level::Medium);
        assert_eq!(task.urgency, Level::Medium);
        assert_eq!(task.status, "todo");
        assert!(task.tags.is_empty());
        assert!(!task.id.is_nil());
    }

    #[test]
    fn legacy_casing_and_dates_are_accepted() {
        let task = decode_fields(&fields(&[
            ("title", "Legacy"),
            ("importance", "High"),
            ("urgency", "LOW"),
            ("due_date", "13/01/2024"),
            ("tags", "a, b"),
        ]))
        .unwrap();
        assert_eq!(task.importance, Level::High);
        assert_eq!(task.urgency, Level::Low);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 1, 13));
        assert_eq!(task.tags.len(), 2);
    }

    #[test]
    fn blank_title_and_bad_level_are_rejected() {
        let blank = decode_fields(&fields(&[("title", "   ")])).unwrap_err();
        assert_eq!(blank, RowIssue::Validation(TaskValidationError::EmptyTitle));

        let bad = decode_fields(&fields(&[("title", "x"), ("urgency", "soon")])).unwrap_err();
        assert!(matches!(bad, RowIssue::InvalidField { column: "urgency", .. }));
    }

    #[test]
    fn atomic_write_replaces_file_and_leaves_siblings_alone() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tasks.csv");
        let sibling = dir.path().join("tasks.tmp");
        std::fs::write(&target, b"old").unwrap();
        std::fs::write(&sibling, b"unrelated").unwrap();

        write_atomic_bytes(&target, b"new").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert_eq!(std::fs::read(&sibling).unwrap(), b"unrelated");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
