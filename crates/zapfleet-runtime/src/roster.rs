//! Contact roster loading.
//!
//! Rosters arrive as uploaded spreadsheets: delimited text (`.csv`) or
//! workbooks (`.xlsx`, `.xls`, `.ods`). The phone column is matched by
//! header name in the first sheet's first row; rows without a value in
//! that column produce no contact.

use std::path::Path;

use calamine::{Data, Reader};
use thiserror::Error;
use tracing::debug;

use zapfleet_core::Contact;

/// Header of the phone column the original exports use.
pub const DEFAULT_PHONE_COLUMN: &str = "Telefone 1";

/// Country code prefixed to every number.
pub const DEFAULT_COUNTRY_CODE: &str = "55";

/// How to read a roster file.
#[derive(Clone, Debug)]
pub struct RosterOptions {
    /// Header of the column holding phone numbers.
    pub phone_column: String,
    /// Country code prefixed to every number.
    pub country_code: String,
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            phone_column: DEFAULT_PHONE_COLUMN.to_owned(),
            country_code: DEFAULT_COUNTRY_CODE.to_owned(),
        }
    }
}

/// Roster read failures. Fatal to the dispatch call that needed the file.
#[derive(Debug, Error)]
pub enum RosterError {
    /// No roster file at the expected location.
    #[error("roster file not found: {0}")]
    NotFound(String),

    /// Filesystem error while reading the roster.
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text parse error.
    #[error("failed to parse csv roster: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook open/parse error.
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The header row has no phone column.
    #[error("roster has no {0:?} column")]
    MissingPhoneColumn(String),

    /// The workbook contains no sheets.
    #[error("workbook has no sheets")]
    EmptyWorkbook,
}

/// Load the ordered contact sequence from a roster file, dispatching on
/// the file extension.
pub fn load_contacts(path: &Path, opts: &RosterOptions) -> Result<Vec<Contact>, RosterError> {
    if !path.exists() {
        return Err(RosterError::NotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let contacts = match ext.as_deref() {
        Some("csv" | "txt") => load_csv(path, opts)?,
        _ => load_workbook(path, opts)?,
    };
    debug!(path = %path.display(), contacts = contacts.len(), "roster loaded");
    Ok(contacts)
}

fn load_csv(path: &Path, opts: &RosterOptions) -> Result<Vec<Contact>, RosterError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == opts.phone_column)
        .ok_or_else(|| RosterError::MissingPhoneColumn(opts.phone_column.clone()))?;

    let mut contacts = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(cell) = record.get(column) else {
            continue;
        };
        if let Some(contact) = Contact::from_raw(cell, &opts.country_code) {
            contacts.push(contact);
        }
    }
    Ok(contacts)
}

fn load_workbook(path: &Path, opts: &RosterOptions) -> Result<Vec<Contact>, RosterError> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(RosterError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| RosterError::MissingPhoneColumn(opts.phone_column.clone()))?;
    let column = headers
        .iter()
        .position(|cell| cell_text(cell).is_some_and(|t| t.trim() == opts.phone_column))
        .ok_or_else(|| RosterError::MissingPhoneColumn(opts.phone_column.clone()))?;

    let mut contacts = Vec::new();
    for row in rows {
        let Some(text) = row.get(column).and_then(cell_text) else {
            continue;
        };
        if let Some(contact) = Contact::from_raw(&text, &opts.country_code) {
            contacts.push(contact);
        }
    }
    Ok(contacts)
}

/// Render a workbook cell as the text it holds. Spreadsheet apps import
/// phone columns as numbers, so integral floats lose their `.0`.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract().abs() < f64::EPSILON => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}
