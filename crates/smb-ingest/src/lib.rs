//! Working-set ingestion for the beer-market pipeline.
//!
//! This crate owns every interaction with the CSV files on disk:
//!
//! - **Discovery**: find the `.csv` files in a working directory
//! - **CSV reading**: parse files (with or without a header) into Polars-backed
//!   tables, or let Polars infer column types for loading
//! - **CSV writing**: serialize tables back with the canonical delimiter
//! - **Delimiter sniffing**: classify a file by its raw first line
//! - **Stage ledger**: remember which transforms each file has been through
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use smb_ingest::{list_csv_files, read_table, write_table};
//!
//! for path in list_csv_files(Path::new("data"))? {
//!     let table = read_table(&path)?;
//!     write_table(&path, &table)?;
//! }
//! ```

mod csv;
mod discovery;
mod error;
mod ledger;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading / Writing ===
pub use self::csv::{
    Delimiter, normalize_header, read_bytes, read_first_line, read_grid, read_table,
    read_table_inferred, read_table_with, render_table, sniff_delimiter, sniff_line, write_bytes,
    write_table,
};

// === File Discovery ===
pub use discovery::{csv_targets, is_csv, list_csv_files, table_name};

// === Stage Ledger ===
pub use ledger::{LEDGER_FILE_NAME, LedgerEntry, StageLedger, fingerprint, fingerprint_file};
