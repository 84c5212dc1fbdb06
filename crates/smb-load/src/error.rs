use std::path::PathBuf;

use thiserror::Error;

use smb_ingest::IngestError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to load table '{table}': {source}")]
    Table {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to declare relationships for '{table}': {source}")]
    Relationship {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database transaction failed: {0}")]
    Transaction(#[source] rusqlite::Error),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, LoadError>;
