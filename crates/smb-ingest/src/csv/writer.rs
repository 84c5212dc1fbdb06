//! CSV serialization of [`Table`]s.
//!
//! Output is always comma-delimited with `\n` line endings and minimal
//! quoting. Decimal values render with a decimal comma, so they come out
//! quoted.

use std::path::Path;

use csv::{Terminator, WriterBuilder};

use polars::prelude::AnyValue;

use smb_common::any_to_field;
use smb_model::Table;

use crate::error::{IngestError, Result};

/// Serializes a table (header + rows) to CSV bytes.
pub fn render_table(table: &Table) -> Result<Vec<u8>> {
    let to_error = |message: String| IngestError::CsvWrite {
        path: table.name.clone().into(),
        message,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(table.data.get_column_names_str())
        .map_err(|e| to_error(e.to_string()))?;
    let columns = table.data.get_columns();
    for idx in 0..table.height() {
        let fields = columns
            .iter()
            .map(|column| any_to_field(column.get(idx).unwrap_or(AnyValue::Null)));
        writer
            .write_record(fields)
            .map_err(|e| to_error(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| to_error(e.to_string()))
}

/// Writes bytes to a path, replacing its contents.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serializes a table and writes it to `path`.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let bytes = render_table(table)?;
    write_bytes(path, &bytes)
}
