//! Shared utilities for the sell-more-beer crates.
//!
//! This crate provides the helpers used by every pipeline step that touches
//! a cell:
//!
//! - **numeric**: decimal-comma tolerant parsing, integer-cast truncation,
//!   fixed-precision rounding and the decimal-comma output format
//! - **date**: the on-disk date format and Polars day-number conversion
//! - **polars**: `AnyValue` views built on the two modules above

pub mod date;
pub mod numeric;
pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use date::{DATE_FORMAT, date_from_days, days_from_date};
pub use numeric::{
    format_decimal_comma, format_numeric, parse_f64, parse_f64_lenient, parse_i64,
    parse_i64_lenient, round_to, truncate_to_i64,
};
pub use polars::{
    any_as_str, any_key_string, any_to_date, any_to_f64, any_to_f64_strict, any_to_field,
    any_to_i64,
};
