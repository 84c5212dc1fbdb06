//! Numeric normalization.
//!
//! The measure column is rounded to a fixed number of decimals and, under
//! [`MeasurePolicy::Truncate`], cast to a whole number afterwards. Every
//! other numeric column is truncated toward zero. Which columns count as
//! numeric comes from the schema registry; columns it does not list are
//! numeric when every non-null value parses as a number.

use polars::prelude::*;

use smb_common::{any_to_f64, any_to_f64_strict, round_to, truncate_to_i64};
use smb_model::{
    ColumnType, MeasurePolicy, NumericOptions, Table, measure_column, registered_type,
};

use crate::Outcome;
use crate::cells::map_cells;
use crate::error::Result;

fn normalize_measure(table: &mut Table, column: &str, options: &NumericOptions) -> Result<usize> {
    let decimals = options.measure_decimals;
    let rounded = |value: AnyValue<'_>| any_to_f64(value).map(|v| round_to(v, decimals));
    let (series, lost) = match options.measure_policy {
        MeasurePolicy::KeepDecimal => {
            let (values, lost) = map_cells(table, column, rounded)?;
            (Series::new(column.into(), values), lost)
        }
        MeasurePolicy::Truncate => {
            let (values, lost) =
                map_cells(table, column, |value| rounded(value).and_then(truncate_to_i64))?;
            (Series::new(column.into(), values), lost)
        }
    };
    table.set_column(series)?;
    Ok(lost)
}

/// Whether a non-measure column should be truncated to whole numbers.
///
/// All non-null values must parse with a period separator; a column holding
/// any text stays as it is.
fn is_whole_number_column(table: &Table, column: &str) -> Result<bool> {
    if matches!(
        registered_type(&table.name, column),
        Some(ColumnType::Text | ColumnType::Date)
    ) {
        return Ok(false);
    }
    let Some(values) = table.column(column) else {
        return Ok(false);
    };
    if matches!(values.dtype(), DataType::Date | DataType::Boolean) {
        return Ok(false);
    }
    let mut seen = false;
    for idx in 0..values.len() {
        let value = values.get(idx)?;
        if value.is_null() {
            continue;
        }
        if any_to_f64_strict(value).is_none() {
            return Ok(false);
        }
        seen = true;
    }
    Ok(seen)
}

/// Normalizes numeric columns in place.
///
/// The measure is the registered measure column for known tables and
/// `options.measure_column` for the rest.
pub fn normalize_numeric(table: &mut Table, options: &NumericOptions) -> Result<Outcome> {
    let measure = measure_column(&table.name, &options.measure_column).to_string();
    let mut applied = false;
    let mut nulls = 0;

    for column in table.column_names() {
        if column == measure {
            applied = true;
            nulls += normalize_measure(table, &column, options)?;
            continue;
        }

        if !is_whole_number_column(table, &column)? {
            continue;
        }
        applied = true;
        let (values, lost) = map_cells(table, &column, |value| {
            any_to_f64_strict(value).and_then(truncate_to_i64)
        })?;
        table.set_column(Series::new(column.as_str().into(), values))?;
        nulls += lost;
    }

    if nulls > 0 {
        tracing::debug!(table = %table.name, nulls, "numeric coercion produced nulls");
    }

    Ok(if applied {
        Outcome::applied(nulls)
    } else {
        Outcome::skipped()
    })
}
