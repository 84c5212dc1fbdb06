use polars::prelude::PolarsError;
use thiserror::Error;

use smb_model::ModelError;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("dimension table '{0}' is required but was not found")]
    MissingDimension(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
