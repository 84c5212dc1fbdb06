//! Lenient date parsing for extract files.
//!
//! Extracts carry dates in several spellings. Unparseable values yield
//! `None`; callers turn that into a null cell, never an error.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::AnyValue;

use smb_common::{any_as_str, any_to_date};

/// Date-only formats, tried in order.
///
/// Slash dates are month-first; a first field above 12 falls through to the
/// day-first spelling. Dot and dash dates are day-first.
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y", // 03/15/2020
    "%d/%m/%Y", // 15/03/2020
    "%d.%m.%Y", // 15.03.2020
    "%d-%m-%Y", // 15-03-2020
    "%d-%b-%Y", // 15-Mar-2020
    "%d %B %Y", // 15 March 2020
    "%Y%m%d",   // 20200315
];

/// Date-time formats whose time part is discarded.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Parses a date string.
///
/// A bare four-digit year parses as January 1st of that year.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        let year = value.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    for fmt in &DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }

    for fmt in &DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Date view of a cell.
///
/// `Date` cells pass through, text is parsed and a whole-number cell in the
/// four-digit range reads as January 1st of that year.
pub fn value_to_date(value: &AnyValue<'_>) -> Option<NaiveDate> {
    if let Some(date) = any_to_date(value) {
        return Some(date);
    }
    if let Some(text) = any_as_str(value) {
        return parse_date(text);
    }
    let year = match *value {
        AnyValue::Int32(v) => i64::from(v),
        AnyValue::Int64(v) => v,
        _ => return None,
    };
    if (1000..=9999).contains(&year) {
        NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smb_common::days_from_date;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2019-03-15"), Some(ymd(2019, 3, 15)));
        assert_eq!(parse_date("15.03.2019"), Some(ymd(2019, 3, 15)));
        assert_eq!(parse_date("2019-03-15 00:00:00"), Some(ymd(2019, 3, 15)));
        assert_eq!(parse_date("2019"), Some(ymd(2019, 1, 1)));
    }

    #[test]
    fn slash_dates_are_month_first() {
        assert_eq!(parse_date("03/04/2020"), Some(ymd(2020, 3, 4)));
        assert_eq!(parse_date("01/02/2019"), Some(ymd(2019, 1, 2)));
        assert_eq!(parse_date("03/04/2020 10:30"), Some(ymd(2020, 3, 4)));
        // No thirteenth month: read day-first instead.
        assert_eq!(parse_date("15/03/2019"), Some(ymd(2019, 3, 15)));
    }

    #[test]
    fn parse_date_invalid_returns_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2019-13-01"), None);
        assert_eq!(parse_date("31/02/2019"), None);
    }

    #[test]
    fn value_to_date_variants() {
        let day = ymd(2020, 1, 2);
        assert_eq!(value_to_date(&AnyValue::Date(days_from_date(day))), Some(day));
        assert_eq!(value_to_date(&AnyValue::String("2020-01-02")), Some(day));
        assert_eq!(value_to_date(&AnyValue::Int64(2021)), Some(ymd(2021, 1, 1)));
        assert_eq!(value_to_date(&AnyValue::Null), None);
        assert_eq!(value_to_date(&AnyValue::Float64(1.5)), None);
    }
}
