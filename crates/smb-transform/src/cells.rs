//! Column rewriting shared by the transforms.

use chrono::NaiveDate;
use polars::prelude::*;

use smb_common::days_from_date;
use smb_model::Table;

use crate::error::Result;

/// Maps every cell of `column` through `f`.
///
/// Null cells stay null without calling `f`. Also returns how many non-null
/// cells `f` turned into nulls.
pub(crate) fn map_cells<T>(
    table: &Table,
    column: &str,
    mut f: impl FnMut(AnyValue<'_>) -> Option<T>,
) -> Result<(Vec<Option<T>>, usize)> {
    let source = table.data.column(column)?;
    let mut lost = 0;
    let mut values = Vec::with_capacity(source.len());
    for idx in 0..source.len() {
        let value = source.get(idx)?;
        if value.is_null() {
            values.push(None);
            continue;
        }
        let mapped = f(value);
        if mapped.is_none() {
            lost += 1;
        }
        values.push(mapped);
    }
    Ok((values, lost))
}

/// A `Date` series from calendar dates.
pub(crate) fn date_series(name: &str, dates: &[Option<NaiveDate>]) -> Result<Series> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(days_from_date)).collect();
    Ok(Series::new(name.into(), days).cast(&DataType::Date)?)
}
