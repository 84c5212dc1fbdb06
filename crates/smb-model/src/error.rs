use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("column '{column}' has {actual} values but table '{table}' has {expected} rows")]
    ColumnLength {
        table: String,
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("unknown stage '{0}'")]
    UnknownStage(String),
    #[error("table '{table}': {source}")]
    Frame {
        table: String,
        #[source]
        source: PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
