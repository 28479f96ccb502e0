//! Spreadsheet (XLSX) import/export.
//!
//! Every cell is written as text so ids, dates and JSON tag arrays survive a
//! round trip unchanged. Cells that a spreadsheet editor converted to numbers
//! or dates are turned back into their text form on import.

use super::{
    header_cells, import_rows, normalize_headers, require_title_column, row_fields,
    task_to_cells, write_atomic_bytes, ImportOptions, ImportReport, TransferError,
};
use crate::model::task::Task;
use crate::repo::task_repo::TaskRepository;
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use log::info;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const SHEET_NAME: &str = "Tasks";

/// Writes `tasks` to a single-sheet workbook with a bold header row.
pub fn export_xlsx(tasks: &[Task], path: impl AsRef<Path>) -> Result<(), TransferError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in header_cells().into_iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }
    for (index, task) in tasks.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in task_to_cells(task).iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    write_atomic_bytes(path.as_ref(), &bytes)?;
    info!(
        "event=task_export module=transfer status=ok format=xlsx count={}",
        tasks.len()
    );
    Ok(())
}

/// Imports tasks from the first worksheet of an XLSX file.
pub fn import_xlsx<R: TaskRepository>(
    path: impl AsRef<Path>,
    repo: &R,
    options: ImportOptions,
) -> Result<ImportReport, TransferError> {
    let mut workbook: Xlsx<_> = open_workbook(path.as_ref())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(TransferError::EmptyWorkbook)??;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Ok(ImportReport::default());
    };
    let header_text: Vec<String> = header_row.iter().map(cell_text).collect();
    let headers = normalize_headers(header_text.iter().map(String::as_str));
    require_title_column(&headers)?;

    let rows = sheet_rows
        .enumerate()
        .map(|(index, cells)| {
            let text: Vec<String> = cells.iter().map(cell_text).collect();
            (
                index + 2,
                Ok(row_fields(&headers, text.iter().map(String::as_str))),
            )
        })
        .collect::<Vec<_>>();

    import_rows(rows, repo, options)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => excel_serial_to_text(value.as_f64()),
        Data::Error(_) => String::new(),
    }
}

/// Largest serial Excel can display: 9999-12-31.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

// Excel serial day 0 is 1899-12-30 (accounting for the 1900 leap-year bug).
// Serials outside Excel's calendar come back as plain numbers, which then
// fail date parsing and reject the row.
fn excel_serial_to_text(serial: f64) -> String {
    if !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return serial.to_string();
    }
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return serial.to_string();
    };
    let Some(date) = Duration::try_days(serial.trunc() as i64)
        .and_then(|days| epoch.checked_add_signed(days))
    else {
        return serial.to_string();
    };

    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    if seconds == 0 {
        return date.format("%Y-%m-%d").to_string();
    }
    match date
        .and_hms_opt(0, 0, 0)
        .and_then(|start| start.checked_add_signed(Duration::seconds(seconds)))
    {
        Some(moment) => moment.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}
