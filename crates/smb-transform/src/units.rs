//! Unit standardization into litres.

use polars::prelude::*;

use smb_common::{any_as_str, any_to_f64, truncate_to_i64};
use smb_model::schema::{UNIT, VOLUME, VOLUME_LITRES};
use smb_model::{Table, UnitTable};

use crate::Outcome;
use crate::error::Result;

/// Adds (or recomputes) `Volume_Litres` from `Volume` and `Unit`.
///
/// Only tables with both columns and at least one recognized unit label are
/// touched. Rows with an unrecognized label carry their volume through
/// unscaled, so a mixed-unit file is only partly converted. Volumes are
/// parsed tolerating a decimal comma and the result is rounded to the
/// nearest whole litre.
pub fn standardize_units(table: &mut Table, units: &UnitTable) -> Result<Outcome> {
    let (Some(unit), Some(volume)) = (table.column(UNIT), table.column(VOLUME)) else {
        return Ok(Outcome::skipped());
    };

    let mut labels = Vec::with_capacity(unit.len());
    for idx in 0..unit.len() {
        let value = unit.get(idx)?;
        labels.push(any_as_str(&value).map(str::to_string));
    }
    let recognized = labels
        .iter()
        .flatten()
        .any(|label| units.is_recognized(label));
    if !recognized {
        tracing::debug!(table = %table.name, "no recognized unit label");
        return Ok(Outcome::skipped());
    }

    let mut nulls = 0;
    let mut unscaled = 0;
    let mut litres: Vec<Option<i64>> = Vec::with_capacity(volume.len());
    for (idx, label) in labels.iter().enumerate() {
        let value = volume.get(idx)?;
        let was_null = value.is_null();
        let Some(amount) = any_to_f64(value) else {
            if !was_null {
                nulls += 1;
            }
            litres.push(None);
            continue;
        };
        let multiplier = match label.as_deref().and_then(|l| units.multiplier(l)) {
            Some(m) => m,
            None => {
                unscaled += 1;
                1.0
            }
        };
        litres.push(truncate_to_i64((amount * multiplier).round()));
    }

    if unscaled > 0 {
        tracing::debug!(
            table = %table.name,
            rows = unscaled,
            "unrecognized unit labels passed through unscaled"
        );
    }

    table.set_column(Series::new(VOLUME_LITRES.into(), litres))?;
    Ok(Outcome::applied(nulls))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volumes() -> Table {
        Table::from_strings(
            "Market_Sizes",
            &["Unit", "Volume"],
            &[
                &["000 litres", "5"],
                &["million litres", "2"],
                &["hectolitres", "7,4"],
                &["000 litres", "1,2346"],
                &["000 litres", ""],
            ],
        )
        .unwrap()
    }

    fn litres(table: &Table) -> Vec<Option<i64>> {
        table
            .column(VOLUME_LITRES)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn recognized_units_are_scaled() {
        let mut table = volumes();
        let outcome = standardize_units(&mut table, &UnitTable::default()).unwrap();
        assert_eq!(outcome, Outcome::applied(0));
        assert_eq!(
            litres(&table),
            vec![Some(5_000), Some(2_000_000), Some(7), Some(1_235), None]
        );
    }

    #[test]
    fn table_without_recognized_unit_is_skipped() {
        let mut table =
            Table::from_strings("Market_Sizes", &["Unit", "Volume"], &[&["barrels", "3"]])
                .unwrap();
        assert_eq!(
            standardize_units(&mut table, &UnitTable::default()).unwrap(),
            Outcome::skipped()
        );
        assert!(!table.has_column(VOLUME_LITRES));
    }

    #[test]
    fn title_cased_labels_are_scaled() {
        let mut table = Table::from_strings(
            "Market_Sizes",
            &["Unit", "Volume"],
            &[&["000 Litres", "5"], &["Million Litres", "1,5"]],
        )
        .unwrap();
        let outcome = standardize_units(&mut table, &UnitTable::default()).unwrap();
        assert!(outcome.applied);
        assert_eq!(litres(&table), vec![Some(5_000), Some(1_500_000)]);
    }

    #[test]
    fn rerun_recomputes_in_place() {
        let mut table = volumes();
        standardize_units(&mut table, &UnitTable::default()).unwrap();
        let once = table.clone();
        standardize_units(&mut table, &UnitTable::default()).unwrap();
        assert_eq!(table, once);
    }
}
