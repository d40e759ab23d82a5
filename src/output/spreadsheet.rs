//! Spreadsheet writers
//!
//! The default output is an Excel workbook with one `Listings` worksheet: a
//! bold header row followed by one row per listing. A path ending in `.csv`
//! selects comma-separated values instead.
//!
//! Cells are written as text so SKUs such as `00123` keep their leading zeros.

use csv::Writer;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, XlsxError};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

use super::{ListingTable, OutputError, OutputResult};

/// Name of the worksheet holding the listings
pub const LISTINGS_SHEET_NAME: &str = "Listings";

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// File format chosen from the output path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Excel workbook (`.xlsx`)
    Xlsx,
    /// Comma-separated values (`.csv`)
    Csv,
}

impl SpreadsheetFormat {
    /// `.csv` (any case) selects CSV; every other path is written as a workbook
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Xlsx,
        }
    }
}

/// Write `table` to `path`, returning the number of data rows
///
/// Missing parent directories are created. The format follows
/// [`SpreadsheetFormat::from_path`].
pub fn write_spreadsheet<P: AsRef<Path>>(path: P, table: &ListingTable) -> OutputResult<u64> {
    let path = path.as_ref();
    match SpreadsheetFormat::from_path(path) {
        SpreadsheetFormat::Xlsx => write_workbook(path, table),
        SpreadsheetFormat::Csv => {
            let mut writer = CsvSpreadsheetWriter::new(path)?;
            writer.write_table(table)?;
            writer.close()
        }
    }
}

/// Write `table` as an Excel workbook with a single [`LISTINGS_SHEET_NAME`] sheet
pub fn write_workbook<P: AsRef<Path>>(path: P, table: &ListingTable) -> OutputResult<u64> {
    let path = path.as_ref();
    info!("Creating workbook: path={}", path.display());
    create_parent_dir(path)?;

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(LISTINGS_SHEET_NAME).map_err(xlsx_error)?;

    for (col, header) in table.headers().iter().enumerate() {
        worksheet
            .write_string_with_format(0, column_number(col)?, header, &header_format)
            .map_err(xlsx_error)?;
    }

    for (index, row) in table.rows().iter().enumerate() {
        let row_number = RowNum::try_from(index + 1)
            .map_err(|_| OutputError::XlsxError(format!("too many rows: {}", index + 1)))?;
        for (col, cell) in row.iter().enumerate() {
            // Padding cells stay blank
            if cell.is_empty() {
                continue;
            }
            worksheet
                .write_string(row_number, column_number(col)?, cell)
                .map_err(xlsx_error)?;
        }
    }

    worksheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

    workbook.save(path).map_err(xlsx_error)?;

    let rows_written = table.len() as u64;
    info!("Workbook saved: {} rows written", rows_written);
    Ok(rows_written)
}

fn column_number(index: usize) -> OutputResult<ColNum> {
    ColNum::try_from(index)
        .map_err(|_| OutputError::XlsxError(format!("too many columns: {}", index + 1)))
}

fn xlsx_error(err: XlsxError) -> OutputError {
    OutputError::XlsxError(err.to_string())
}

fn create_parent_dir(path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }
    }
    Ok(())
}

/// CSV spreadsheet writer
pub struct CsvSpreadsheetWriter {
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvSpreadsheetWriter {
    /// Create the output file, including missing parent directories
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());
        create_parent_dir(path)?;

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;

        let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
        Ok(Self {
            writer: Writer::from_writer(buf_writer),
            rows_written: 0,
        })
    }

    /// Write the header row followed by every data row
    pub fn write_table(&mut self, table: &ListingTable) -> OutputResult<()> {
        self.writer
            .write_record(table.headers())
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))?;

        for row in table.rows() {
            self.writer
                .write_record(row)
                .map_err(|e| OutputError::CsvError(format!("Failed to write row: {e}")))?;
            self.rows_written += 1;
        }

        debug!("Wrote {} rows", self.rows_written);
        Ok(())
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and sync the file to disk
    pub fn close(mut self) -> OutputResult<u64> {
        self.writer
            .flush()
            .map_err(|e| OutputError::IoError(format!("Failed to flush: {e}")))?;

        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {e}")))?;

        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {e}")))?;

        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {e}")))?;

        info!("CSV closed: {} rows written", self.rows_written);
        Ok(self.rows_written)
    }
}
