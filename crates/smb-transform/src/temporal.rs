//! Year and date reconciliation.
//!
//! Fact extracts carry a year in `Year` or `Year_text` and a full date in
//! `Year_date`. When both are present and disagree, the year wins: the date
//! keeps its month and day and takes the stored year.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

use smb_common::any_to_i64;
use smb_model::Table;
use smb_model::schema::{YEAR, YEAR_DATE, YEAR_TEXT};

use crate::Outcome;
use crate::cells::{date_series, map_cells};
use crate::datetime::value_to_date;
use crate::error::Result;

/// Replaces a column with its whole-number view, counting values lost.
fn coerce_year(table: &mut Table, column: &str) -> Result<usize> {
    let (years, lost) = map_cells(table, column, any_to_i64)?;
    table.set_column(Series::new(column.into(), years))?;
    Ok(lost)
}

fn shift_year(date: NaiveDate, year: i64) -> Option<NaiveDate> {
    let year = i32::try_from(year).ok()?;
    date.with_year(year)
}

/// Reconciles the temporal columns of a table.
///
/// - `Year_text` is coerced to a whole number and renamed to `Year`,
///   replacing any existing `Year` column.
/// - `Year` is coerced to a whole number.
/// - `Year_date` is parsed to a date, then shifted to `Year` where both are
///   set and the years differ.
///
/// Unparseable values and shifts onto an invalid day (29 February into a
/// common year) become null. Returns a skipped outcome when the table has
/// none of the three columns.
pub fn reconcile_temporal(table: &mut Table) -> Result<Outcome> {
    let has_any = [YEAR_TEXT, YEAR, YEAR_DATE]
        .iter()
        .any(|column| table.has_column(column));
    if !has_any {
        return Ok(Outcome::skipped());
    }

    let mut nulls = 0;

    if table.has_column(YEAR_TEXT) {
        nulls += coerce_year(table, YEAR_TEXT)?;
        if table.has_column(YEAR) {
            tracing::debug!(table = %table.name, "Year_text replaces existing Year column");
        }
        table.rename_column(YEAR_TEXT, YEAR)?;
    }

    if table.has_column(YEAR) {
        nulls += coerce_year(table, YEAR)?;
    }

    if !table.has_column(YEAR_DATE) {
        return Ok(Outcome::applied(nulls));
    }
    let (mut dates, lost) = map_cells(table, YEAR_DATE, |value| value_to_date(&value))?;
    nulls += lost;

    if table.has_column(YEAR) {
        let (years, _) = map_cells(table, YEAR, any_to_i64)?;
        let mut invalid = 0;
        for (date, year) in dates.iter_mut().zip(years) {
            let (Some(day), Some(year)) = (*date, year) else {
                continue;
            };
            if i64::from(day.year()) == year {
                continue;
            }
            *date = shift_year(day, year);
            if date.is_none() {
                invalid += 1;
            }
        }
        if invalid > 0 {
            tracing::warn!(
                table = %table.name,
                count = invalid,
                "year shift produced an invalid date, set to null"
            );
        }
        nulls += invalid;
    }

    table.set_column(date_series(YEAR_DATE, &dates)?)?;
    Ok(Outcome::applied(nulls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smb_common::days_from_date;

    fn ymd(y: i32, m: u32, d: u32) -> Option<AnyValue<'static>> {
        Some(AnyValue::Date(days_from_date(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        )))
    }

    #[test]
    fn date_takes_the_stored_year() {
        let mut table = Table::from_strings(
            "Market_Sizes",
            &["Year", "Year_date"],
            &[&["2020", "2019-03-15"], &["2021", "2021-06-01"]],
        )
        .unwrap();
        let outcome = reconcile_temporal(&mut table).unwrap();
        assert_eq!(outcome, Outcome::applied(0));
        assert_eq!(table.value(0, "Year"), Some(AnyValue::Int64(2020)));
        assert_eq!(table.value(0, "Year_date"), ymd(2020, 3, 15));
        assert_eq!(table.value(1, "Year_date"), ymd(2021, 6, 1));
        assert_eq!(table.column("Year_date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn unparseable_date_becomes_null() {
        let mut table = Table::from_strings(
            "Market_Sizes",
            &["Year", "Year_date"],
            &[&["2020", "not a date"], &["n/a", "2019-01-01"]],
        )
        .unwrap();
        let outcome = reconcile_temporal(&mut table).unwrap();
        assert_eq!(outcome.nulls, 2);
        assert_eq!(table.value(0, "Year_date"), Some(AnyValue::Null));
        assert_eq!(table.value(1, "Year"), Some(AnyValue::Null));
        // No year to reconcile against: the date is kept.
        assert_eq!(table.value(1, "Year_date"), ymd(2019, 1, 1));
    }

    #[test]
    fn year_text_replaces_year() {
        let mut table = Table::from_strings(
            "Company_Share_GBO_unit",
            &["Year", "Year_text", "Volume"],
            &[&["1999", "2020.0", "1"]],
        )
        .unwrap();
        reconcile_temporal(&mut table).unwrap();
        assert_eq!(table.column_names(), vec!["Year", "Volume"]);
        assert_eq!(table.value(0, "Year"), Some(AnyValue::Int64(2020)));
    }

    #[test]
    fn leap_day_shift_into_common_year_is_null() {
        let mut table = Table::from_strings(
            "Market_Sizes",
            &["Year", "Year_date"],
            &[&["2021", "2020-02-29"]],
        )
        .unwrap();
        let outcome = reconcile_temporal(&mut table).unwrap();
        assert_eq!(outcome.nulls, 1);
        assert_eq!(table.value(0, "Year_date"), Some(AnyValue::Null));
    }

    #[test]
    fn table_without_temporal_columns_is_skipped() {
        let mut table =
            Table::from_strings("Categories", &["id", "Name"], &[&["1", "Lager"]]).unwrap();
        assert_eq!(reconcile_temporal(&mut table).unwrap(), Outcome::skipped());
    }

    #[test]
    fn reconciling_twice_is_stable() {
        let mut table = Table::from_strings(
            "Market_Sizes",
            &["Year_text", "Year_date"],
            &[&["2020", "15/03/2019"]],
        )
        .unwrap();
        reconcile_temporal(&mut table).unwrap();
        let once = table.clone();
        reconcile_temporal(&mut table).unwrap();
        assert_eq!(table, once);
        assert_eq!(table.value(0, "Year_date"), ymd(2020, 3, 15));
    }
}
