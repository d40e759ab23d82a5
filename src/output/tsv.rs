//! Tab-separated report decoding
//!
//! Listings reports are UTF-8, tab-delimited, with a header row and no quoting:
//! a `"` inside a product title is literal text.

use csv::ReaderBuilder;
use tracing::debug;

use super::{ListingTable, OutputError, OutputResult};

/// Decode a raw report payload into a [`ListingTable`]
///
/// # Errors
/// [`OutputError::Decode`] for non-UTF-8 input, an empty payload, or a row
/// wider than the header.
pub fn decode_tsv(bytes: &[u8]) -> OutputResult<ListingTable> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| OutputError::Decode(format!("report is not valid UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Err(OutputError::Decode("report is empty".to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| OutputError::Decode(format!("failed to read header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| OutputError::Decode(format!("failed to read row: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "decoded report");
    ListingTable::new(headers, rows)
}
