//! CSV Loader
//!
//! Reads a CSV file into a column-indexed, row-ordered table of raw strings.
//! No value is interpreted here; cleaning happens in `csv_validator`.

use crate::constants::MAX_CSV_BYTES;
use crate::error::{Error, Result};
use crate::utils::{symbol_csv_path, validate_symbol};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

/// Raw CSV contents: trimmed headers plus string records in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from in-memory headers and rows
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of a column, matched case-insensitively after trimming
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    }

    /// Cell value; rows shorter than the header read as missing
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.records
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }

    /// All values of a named column in row order, or `None` if the column
    /// is absent from the source
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(
            (0..self.records.len())
                .map(|row| self.cell(row, idx))
                .collect(),
        )
    }
}

/// Read a CSV file into a `RawTable`
///
/// A missing file is `NotFound`; a file over `MAX_CSV_BYTES` or one the CSV
/// reader rejects is `MalformedInput`.
pub fn read_csv(path: &Path) -> Result<RawTable> {
    let metadata = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!("File not found: {}", path.display())));
        }
        Err(e) => return Err(Error::Io(format!("Failed to stat {}: {}", path.display(), e))),
    };

    if metadata.len() > MAX_CSV_BYTES {
        return Err(Error::MalformedInput(format!(
            "{} is {} bytes, larger than the {} byte limit",
            path.display(),
            metadata.len(),
            MAX_CSV_BYTES
        )));
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }

    debug!(path = %path.display(), rows = records.len(), "Loaded CSV");

    Ok(RawTable { headers, records })
}

/// Load `<data_dir>/<SYMBOL>.csv` for a ticker (case-normalized to uppercase)
pub fn load_symbol(data_dir: &Path, symbol: &str) -> Result<RawTable> {
    let symbol = validate_symbol(symbol)?;
    let path = symbol_csv_path(data_dir, &symbol)?;
    read_csv(&path).map_err(|e| match e {
        Error::NotFound(_) => Error::NotFound(format!("Data for {} not found", symbol)),
        other => other,
    })
}
