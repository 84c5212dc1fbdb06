//! SQLite loading for the beer-market pipeline.
//!
//! Loads every CSV of a working directory as a table and declares the
//! foreign-key relationship tables afterwards.

mod error;
mod loader;
mod sql;

pub use error::{LoadError, Result};
pub use loader::{LoadOptions, LoadReport, LoadedTable, load_directory, load_tables};
pub use sql::{SqlType, quote_ident, relationship_sql};
