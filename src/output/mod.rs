//! Report decoding and spreadsheet output

use std::collections::BTreeMap;

pub mod spreadsheet;
pub mod tsv;

pub use spreadsheet::{
    write_spreadsheet, write_workbook, CsvSpreadsheetWriter, SpreadsheetFormat,
    LISTINGS_SHEET_NAME,
};
pub use tsv::decode_tsv;

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Payload could not be decoded into a table
    #[error("decode error: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Excel workbook write error
    #[error("Excel error: {0}")]
    XlsxError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Decoded listings report: a header row plus string cells
///
/// Every row has exactly as many cells as there are headers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ListingTable {
    /// Build a table, padding short rows with empty cells
    ///
    /// # Errors
    /// [`OutputError::Decode`] when a row has more cells than there are headers.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> OutputResult<Self> {
        let width = headers.len();
        let mut normalized = Vec::with_capacity(rows.len());

        for (index, mut row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(OutputError::Decode(format!(
                    "row {} has {} fields but the header has {}",
                    index + 1,
                    row.len(),
                    width
                )));
            }
            row.resize(width, String::new());
            normalized.push(row);
        }

        Ok(Self {
            headers,
            rows: normalized,
        })
    }

    /// Column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the report has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row as a column name → value map
    pub fn record(&self, index: usize) -> Option<BTreeMap<String, String>> {
        let row = self.rows.get(index)?;
        Some(
            self.headers
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    /// First `limit` rows as JSON objects keyed by column name
    pub fn preview_json(&self, limit: usize) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| (header.clone(), serde_json::Value::from(cell.as_str())))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect()
    }

    /// First `limit` rows as tab-separated lines, header first
    pub fn preview_lines(&self, limit: usize) -> Vec<String> {
        std::iter::once(self.headers.join("\t"))
            .chain(self.rows.iter().take(limit).map(|row| row.join("\t")))
            .collect()
    }
}
