//! CSV file reading into [`Table`]s and headerless grids.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::*;

use smb_model::{Grid, Table, unique_column_names};

use crate::discovery::table_name;
use crate::error::{IngestError, Result};

use super::header::{Delimiter, normalize_header, sniff_line};

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| IngestError::read(path, e))
}

/// Reads a file's raw bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| IngestError::read(path, e))
}

/// Reads the raw first line of a file, without CSV parsing.
///
/// A UTF-8 BOM and the line terminator are stripped. An empty file yields an
/// empty string.
pub fn read_first_line(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(open(path)?);
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| IngestError::read(path, e))?;
    let cleaned = line.strip_prefix('\u{feff}').unwrap_or(&line);
    Ok(cleaned.trim_end_matches(['\r', '\n']).to_string())
}

/// Detects a file's delimiter from its first line.
pub fn sniff_delimiter(path: &Path) -> Result<Delimiter> {
    Ok(sniff_line(&read_first_line(path)?))
}

fn raw_records(path: &Path, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(open(path)?);
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::csv(path, &e))?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

fn build(path: &Path, header: &[String], records: &[Vec<String>]) -> Result<Table> {
    Table::from_records(table_name(path), header, records).map_err(|source| IngestError::Table {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a comma-delimited CSV file with a header row.
pub fn read_table(path: &Path) -> Result<Table> {
    read_table_with(path, b',')
}

/// Reads a CSV file with a header row using the given delimiter.
///
/// The table is named after the file stem and every column is `String`
/// typed. Empty fields are null; everything else is kept verbatim.
pub fn read_table_with(path: &Path, delimiter: u8) -> Result<Table> {
    let mut records = raw_records(path, delimiter)?;
    if records.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    let header = unique_column_names(records.remove(0).iter().map(|h| normalize_header(h)));
    if let Some(widest) = records.iter().map(Vec::len).max().filter(|w| *w > header.len()) {
        tracing::debug!(
            path = %path.display(),
            fields = widest,
            columns = header.len(),
            "record wider than header, extra fields dropped"
        );
    }
    build(path, &header, &records)
}

/// Reads a comma-delimited CSV file with no header: every row is data.
///
/// Short rows are padded with nulls to the widest row. Columns are named
/// `column_0`, `column_1`, ...
pub fn read_grid(path: &Path) -> Result<Grid> {
    let records = raw_records(path, b',')?;
    let width = records.iter().map(Vec::len).max().unwrap_or(0);
    let header: Vec<String> = (0..width).map(|idx| format!("column_{idx}")).collect();
    Ok(build(path, &header, &records)?.data)
}

/// Reads a comma-delimited CSV file letting Polars infer each column's type
/// from all of its values.
///
/// Whole-number columns come back as `Int64`, period decimals as `Float64`
/// and everything else, decimal-comma values included, as `String`.
pub fn read_table_inferred(path: &Path) -> Result<Table> {
    let frame_error = |source| IngestError::Frame {
        path: path.to_path_buf(),
        source,
    };
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(frame_error)?
        .finish()
        .map_err(frame_error)?;

    let names = unique_column_names(
        df.get_column_names_str()
            .into_iter()
            .map(normalize_header),
    );
    df.set_column_names(names.as_slice()).map_err(frame_error)?;
    Ok(Table::new(table_name(path), df))
}
