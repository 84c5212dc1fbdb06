//! Error types for CSV ingestion and rewriting.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use smb_model::ModelError;

/// Errors that can occur while reading or writing working-set files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Failed to parse CSV.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to serialize CSV.
    #[error("failed to serialize CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    /// CSV file is empty or has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Parsed records could not be assembled into a table.
    #[error("failed to build table from {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    /// Polars failed to read or type a CSV file.
    #[error("failed to read {path} into a data frame: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    // === Ledger Errors ===
    /// Stage ledger could not be parsed or serialized.
    #[error("stage ledger {path} is invalid: {source}")]
    Ledger {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn csv(path: &std::path::Path, err: &csv::Error) -> Self {
        IngestError::CsvParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
