//! Spreadsheet file loading
//!
//! Reads every worksheet of an `.xlsx`, `.xls` or `.ods` file into an
//! in-memory [`Workbook`]. Rows and columns before the used range are padded
//! with blank cells so row indices match the sheet as the author sees it.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use octofhir_valueset_diagnostics::{Result, ValueSetError};

use crate::{Cell, Sheet, Workbook};

/// Load a workbook from disk
pub fn open(path: impl AsRef<Path>) -> Result<Workbook> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path).map_err(|e| ValueSetError::Workbook {
        message: format!("failed to open {}: {}", path.display(), e),
    })?;

    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ValueSetError::Workbook {
                message: format!("failed to read sheet '{}': {}", name, e),
            })?;
        tracing::debug!(sheet = %name, rows = range.height(), "loaded worksheet");
        sheets.push(range_to_sheet(&name, &range));
    }

    Ok(Workbook::new(sheets))
}

fn range_to_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or_default();

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for data_row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(data_row.iter().map(convert_value));
        rows.push(cells);
    }

    Sheet::new(name, rows)
}

fn convert_value(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(Cell::Text)
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Excel serial day number (1900 date system) to an ISO date string
fn excel_serial_to_date(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(serial.floor() as i64))?;
    Some(date.format("%Y-%m-%d").to_string())
}
