//! Date dimension construction.
//!
//! The dimension is the union of every scanned table's own inclusive date
//! range, not one global span: two tables covering January and June give a
//! calendar with a gap between them.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

use smb_common::{date_from_days, days_from_date};
use smb_model::Table;
use smb_model::schema::DATE;

use crate::datetime::value_to_date;
use crate::error::Result;

/// Columns of the generated dimension, in order.
pub const DATE_DIMENSION_COLUMNS: [&str; 13] = [
    DATE,
    "Year",
    "Quarter_Num",
    "Quarter",
    "Month_Num",
    "Month_Name",
    "Month_MMM",
    "WeekOfYear_Num",
    "DayOfMonth_Num",
    "DayOfWeek_Num",
    "DayOfWeek_Name",
    "DayOfWeek_MMM",
    "DayOfYear_Num",
];

/// Earliest and latest parseable date in a column.
///
/// Returns `None` when the column is absent or holds no parseable date.
pub fn date_range(table: &Table, column: &str) -> Option<(NaiveDate, NaiveDate)> {
    let values = table.column(column)?;
    (0..values.len())
        .filter_map(|idx| values.get(idx).ok())
        .filter_map(|value| value_to_date(&value))
        .fold(None, |range, date| match range {
            None => Some((date, date)),
            Some((min, max)) => Some((min.min(date), max.max(date))),
        })
}

/// Every day from `start` to `end` inclusive as a `Date` series. Empty when
/// `end` precedes `start`.
fn day_range(start: NaiveDate, end: NaiveDate) -> Result<Series> {
    let days: Vec<i32> = (days_from_date(start)..=days_from_date(end)).collect();
    Ok(Series::new(DATE.into(), days).cast(&DataType::Date)?)
}

fn int_column<T>(name: &str, days: &[NaiveDate], f: impl Fn(&NaiveDate) -> T) -> Column
where
    T: Into<i64>,
{
    let values: Vec<i64> = days.iter().map(|day| f(day).into()).collect();
    Series::new(name.into(), values).into()
}

fn text_column(name: &str, days: &[NaiveDate], f: impl Fn(&NaiveDate) -> String) -> Column {
    let values: Vec<String> = days.iter().map(f).collect();
    Series::new(name.into(), values).into()
}

/// Builds the date dimension from per-table date ranges.
///
/// Every day of every range appears exactly once, sorted ascending.
pub fn build_date_dimension<I>(name: &str, ranges: I) -> Result<Table>
where
    I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
{
    let mut dates = Series::new_empty(DATE.into(), &DataType::Date);
    for (start, end) in ranges {
        dates.append(&day_range(start, end)?)?;
    }
    let dates = dates.unique()?.sort(SortOptions::default())?;

    let physical = dates.cast(&DataType::Int32)?;
    let days: Vec<NaiveDate> = physical
        .i32()?
        .into_no_null_iter()
        .filter_map(date_from_days)
        .collect();

    let [
        _,
        year,
        quarter_num,
        quarter,
        month_num,
        month_name,
        month_mmm,
        week,
        day_of_month,
        day_of_week,
        day_name,
        day_mmm,
        day_of_year,
    ] = DATE_DIMENSION_COLUMNS;
    let quarter_of = |day: &NaiveDate| day.month0() / 3 + 1;
    let columns = vec![
        dates.into(),
        int_column(year, &days, NaiveDate::year),
        int_column(quarter_num, &days, quarter_of),
        text_column(quarter, &days, |day| format!("Q{}", quarter_of(day))),
        int_column(month_num, &days, NaiveDate::month),
        text_column(month_name, &days, |day| day.format("%B").to_string()),
        text_column(month_mmm, &days, |day| {
            day.format("%b").to_string().to_uppercase()
        }),
        int_column(week, &days, |day| day.iso_week().week()),
        int_column(day_of_month, &days, NaiveDate::day),
        int_column(day_of_week, &days, |day| {
            day.weekday().num_days_from_monday()
        }),
        text_column(day_name, &days, |day| day.format("%A").to_string()),
        text_column(day_mmm, &days, |day| {
            day.format("%a").to_string().to_uppercase()
        }),
        int_column(day_of_year, &days, NaiveDate::ordinal),
    ];

    Ok(Table::new(name, DataFrame::new(columns)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_ignores_unparseable_values() {
        let table = Table::from_strings(
            "Market_Sizes",
            &["Year_date"],
            &[&["2021-01-03"], &["junk"], &[""], &["2021-01-01"]],
        )
        .unwrap();
        assert_eq!(
            date_range(&table, "Year_date"),
            Some((ymd(2021, 1, 1), ymd(2021, 1, 3)))
        );
        assert_eq!(date_range(&table, "Date"), None);
    }

    #[test]
    fn disjoint_ranges_leave_a_gap() {
        let table = build_date_dimension(
            "Date_Table",
            [
                (ymd(2021, 6, 1), ymd(2021, 6, 2)),
                (ymd(2021, 1, 1), ymd(2021, 1, 3)),
                (ymd(2021, 1, 2), ymd(2021, 1, 2)),
            ],
        )
        .unwrap();
        assert_eq!(
            table.fields(DATE).unwrap(),
            vec!["2021-01-01", "2021-01-02", "2021-01-03", "2021-06-01", "2021-06-02"]
        );
        assert_eq!(table.column(DATE).unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn calendar_attributes() {
        let table =
            build_date_dimension("Date_Table", [(ymd(2021, 6, 1), ymd(2021, 6, 1))]).unwrap();
        assert_eq!(table.column_names(), DATE_DIMENSION_COLUMNS);
        let row: Vec<String> = DATE_DIMENSION_COLUMNS
            .iter()
            .map(|column| table.field(0, column).unwrap_or_default())
            .collect();
        insta::assert_snapshot!(row.join(","), @"2021-06-01,2021,2,Q2,6,June,JUN,22,1,1,Tuesday,TUE,152");
    }

    #[test]
    fn iso_week_spans_year_boundary() {
        let table =
            build_date_dimension("Date_Table", [(ymd(2021, 1, 1), ymd(2021, 1, 1))]).unwrap();
        assert_eq!(table.value(0, "WeekOfYear_Num"), Some(AnyValue::Int64(53)));
        assert_eq!(table.value(0, "DayOfWeek_Num"), Some(AnyValue::Int64(4)));
        assert_eq!(table.value(0, "DayOfYear_Num"), Some(AnyValue::Int64(1)));
    }

    #[test]
    fn inverted_range_is_empty() {
        let table =
            build_date_dimension("Date_Table", [(ymd(2021, 1, 3), ymd(2021, 1, 1))]).unwrap();
        assert_eq!(table.height(), 0);
        assert_eq!(table.width(), DATE_DIMENSION_COLUMNS.len());
    }
}
