//! Comma-separated values import/export.

use super::{
    header_cells, import_rows, normalize_headers, require_title_column, row_fields,
    task_to_cells, write_atomic_bytes, ImportOptions, ImportReport, RowFields, RowIssue,
    TransferError,
};
use crate::db::schema::TASK_COLUMNS;
use crate::model::task::Task;
use crate::repo::task_repo::TaskRepository;
use log::info;
use std::path::Path;

/// Writes `tasks` as UTF-8 CSV with a header row.
pub fn export_csv(tasks: &[Task], path: impl AsRef<Path>) -> Result<(), TransferError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header_cells())?;
    for task in tasks {
        writer.write_record(task_to_cells(task))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| TransferError::Io(err.into_error()))?;

    write_atomic_bytes(path, &bytes)?;
    info!(
        "event=task_export module=transfer status=ok format=csv count={}",
        tasks.len()
    );
    Ok(())
}

/// Imports tasks from a CSV file with a header row.
///
/// Columns are matched by header name, so order and extra columns do not
/// matter; only `title` is required. A row with bytes that are not valid
/// UTF-8 is rejected without stopping the import.
pub fn import_csv<R: TaskRepository>(
    path: impl AsRef<Path>,
    repo: &R,
    options: ImportOptions,
) -> Result<ImportReport, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path.as_ref())?;
    let headers = normalize_headers(reader.headers()?.iter());
    require_title_column(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in reader.byte_records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map_or(index + 2, |position| position.line() as usize);
        rows.push((line, decode_record(&headers, &record)));
    }

    import_rows(rows, repo, options)
}

// Fields are decoded one row at a time so a stray non-UTF-8 byte rejects
// only the row that carries it.
fn decode_record(headers: &[String], record: &csv::ByteRecord) -> Result<RowFields, RowIssue> {
    let mut cells = Vec::with_capacity(record.len());
    for (index, bytes) in record.iter().enumerate() {
        match std::str::from_utf8(bytes) {
            Ok(text) => cells.push(text),
            Err(_) => {
                return Err(RowIssue::InvalidField {
                    column: column_name(headers, index),
                    value: String::from_utf8_lossy(bytes).into_owned(),
                })
            }
        }
    }
    Ok(row_fields(headers, cells))
}

fn column_name(headers: &[String], index: usize) -> &'static str {
    headers
        .get(index)
        .and_then(|name| TASK_COLUMNS.iter().find(|column| **column == name.as_str()))
        .copied()
        .unwrap_or("unknown")
}
