//! Polars `AnyValue` utility functions.
//!
//! Every table in the pipeline is a Polars `DataFrame`. Columns read from
//! disk are `String` typed; steps replace them with `Int64`, `Float64` or
//! `Date` columns. These helpers give each step the same view of a cell
//! whichever of those types it currently holds.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::date::{DATE_FORMAT, date_from_days};
use crate::numeric::{
    format_decimal_comma, parse_f64, parse_f64_lenient, parse_i64_lenient, truncate_to_i64,
};

/// Renders a cell as a CSV field.
///
/// Returns an empty string for `Null`. Floats use a decimal comma and dates
/// use [`DATE_FORMAT`].
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use smb_common::any_to_field;
///
/// assert_eq!(any_to_field(AnyValue::Null), "");
/// assert_eq!(any_to_field(AnyValue::Int64(42)), "42");
/// assert_eq!(any_to_field(AnyValue::Float64(12.5)), "12,5");
/// assert_eq!(any_to_field(AnyValue::String("Lager")), "Lager");
/// ```
pub fn any_to_field(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_decimal_comma(f64::from(v)),
        AnyValue::Float64(v) => format_decimal_comma(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Date(days) => match date_from_days(days) {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => days.to_string(),
        },
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Borrows the text of a `String` cell.
pub fn any_as_str<'a>(value: &'a AnyValue<'_>) -> Option<&'a str> {
    match value {
        AnyValue::String(s) => Some(s),
        AnyValue::StringOwned(s) => Some(s.as_str()),
        _ => None,
    }
}

fn integer(value: &AnyValue<'_>) -> Option<i64> {
    match *value {
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        _ => None,
    }
}

fn float(value: &AnyValue<'_>) -> Option<f64> {
    match *value {
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        _ => None,
    }
}

/// Converts a cell to `f64`, accepting a decimal comma in text.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    if let Some(v) = integer(&value) {
        return Some(v as f64);
    }
    float(&value).or_else(|| any_as_str(&value).and_then(parse_f64_lenient))
}

/// Converts a cell to `f64`; text must use a period decimal separator.
pub fn any_to_f64_strict(value: AnyValue<'_>) -> Option<f64> {
    if let Some(v) = integer(&value) {
        return Some(v as f64);
    }
    float(&value).or_else(|| any_as_str(&value).and_then(parse_f64))
}

/// Converts a cell to a whole number. Floats are truncated toward zero.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    integer(&value)
        .or_else(|| float(&value).and_then(truncate_to_i64))
        .or_else(|| any_as_str(&value).and_then(parse_i64_lenient))
}

/// Calendar date held by a `Date` cell.
pub fn any_to_date(value: &AnyValue<'_>) -> Option<NaiveDate> {
    match *value {
        AnyValue::Date(days) => date_from_days(days),
        _ => None,
    }
}

fn whole(value: f64) -> Option<String> {
    (value.fract() == 0.0)
        .then(|| truncate_to_i64(value))
        .flatten()
        .map(|v| v.to_string())
}

/// Normalized text used when matching keys across tables.
///
/// Whole numbers compare equal however they were written, so a fact row
/// holding `"3.0"` matches a dimension id of `3`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use smb_common::any_key_string;
///
/// assert_eq!(any_key_string(AnyValue::String(" 3.0 ")), Some("3".to_string()));
/// assert_eq!(any_key_string(AnyValue::Int64(3)), Some("3".to_string()));
/// assert_eq!(any_key_string(AnyValue::Null), None);
/// ```
pub fn any_key_string(value: AnyValue<'_>) -> Option<String> {
    if value.is_null() {
        return None;
    }
    if let Some(v) = integer(&value) {
        return Some(v.to_string());
    }
    if let Some(v) = float(&value) {
        return Some(whole(v).unwrap_or_else(|| format_decimal_comma(v)));
    }
    if let Some(s) = any_as_str(&value) {
        let trimmed = s.trim();
        return Some(
            parse_f64(trimmed)
                .and_then(whole)
                .unwrap_or_else(|| trimmed.to_string()),
        );
    }
    Some(any_to_field(value))
}
