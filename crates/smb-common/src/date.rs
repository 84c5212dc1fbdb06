//! Calendar dates as Polars stores them.

use chrono::{Datelike, NaiveDate};

/// On-disk date format for every date the pipeline writes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Converts a Polars `Date` (days since the Unix epoch) to a calendar date.
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_FROM_CE)?)
}

/// Converts a calendar date to a Polars `Date` day number.
pub fn days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_day_zero() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(days_from_date(epoch), 0);
        assert_eq!(date_from_days(0), Some(epoch));
        assert_eq!(
            date_from_days(-1),
            NaiveDate::from_ymd_opt(1969, 12, 31)
        );
    }

    #[test]
    fn days_convert_both_ways() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        assert_eq!(date_from_days(days_from_date(date)), Some(date));
        assert_eq!(date_from_days(i32::MAX), None);
    }
}
