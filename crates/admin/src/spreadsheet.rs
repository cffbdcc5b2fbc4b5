//! Spreadsheet parsing for the bulk import.
//!
//! Reads the first worksheet of an `.xlsx`/`.xls` workbook into JSON objects
//! keyed by the header row. Rows are otherwise opaque: every non-empty cell
//! is carried along, whether or not its column is one of the known three.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::{Map, Value};
use thiserror::Error;

use roster_core::{CustomerRecord, REQUIRED_COLUMNS};

/// File extensions accepted by the import control.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Errors from reading an import file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Only .xlsx and .xls files can be imported (got \"{0}\")")]
    UnsupportedFileType(String),

    #[error("Could not read the spreadsheet: {0}")]
    Unreadable(String),

    #[error("The workbook has no worksheets")]
    NoSheets,

    #[error("Template mismatch: the spreadsheet has no data rows")]
    NoRows,

    #[error("Template mismatch: missing column(s) {}", .missing.join(", "))]
    TemplateMismatch { missing: Vec<String> },
}

/// Contents of one worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// Header row, blank headers dropped.
    pub headers: Vec<String>,
    /// Data rows keyed by header, all-blank rows dropped.
    pub rows: Vec<Map<String, Value>>,
}

impl Sheet {
    /// Required columns absent from the header row, in template order.
    #[must_use]
    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|column| !self.headers.iter().any(|h| h == *column))
            .map(ToString::to_string)
            .collect()
    }
}

/// Reject file names without an accepted extension (case-insensitive).
///
/// # Errors
///
/// Returns [`ImportError::UnsupportedFileType`].
pub fn check_extension(file_name: &str) -> Result<(), ImportError> {
    let accepted = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        });

    if accepted {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFileType(file_name.to_string()))
    }
}

/// Parse the first worksheet of a workbook.
///
/// # Errors
///
/// Returns an error if the bytes are not a readable workbook or it has no
/// worksheets.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Sheet, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoSheets)?
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Sheet::default());
    };

    // Header text is kept verbatim; the template match is exact
    let columns: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| cell_value(cell).map(|v| value_text(&v)))
        .collect();

    let data = rows
        .map(|row| {
            row.iter()
                .zip(&columns)
                .filter_map(|(cell, column)| Some((column.clone()?, cell_value(cell)?)))
                .collect::<Map<String, Value>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    Ok(Sheet {
        headers: columns.into_iter().flatten().collect(),
        rows: data,
    })
}

/// Parse an import file into customer records, validating the template.
///
/// # Errors
///
/// Returns [`ImportError::NoRows`] or [`ImportError::TemplateMismatch`] when
/// the sheet does not follow the template, or a read error.
pub fn customer_rows(bytes: &[u8]) -> Result<Vec<CustomerRecord>, ImportError> {
    let sheet = read_first_sheet(bytes)?;

    let missing = sheet.missing_columns();
    if !missing.is_empty() {
        return Err(ImportError::TemplateMismatch { missing });
    }
    if sheet.rows.is_empty() {
        return Err(ImportError::NoRows);
    }

    sheet
        .rows
        .into_iter()
        .map(|row| {
            serde_json::from_value(Value::Object(row))
                .map_err(|e| ImportError::Unreadable(e.to_string()))
        })
        .collect()
}

/// JSON value of a cell, `None` for blanks.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        #[allow(clippy::cast_possible_truncation)]
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(Value::from(*f as i64)),
        Data::Float(f) => Some(Value::from(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(other.to_string())),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
