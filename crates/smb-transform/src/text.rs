//! Text case normalization.

use polars::prelude::*;

use smb_common::any_as_str;
use smb_model::{ColumnType, Table, TableKind, measure_column, registered_type, schema_for};

use crate::cells::map_cells;
use crate::error::Result;

/// Capitalizes each whitespace-separated word and lower-cases the rest.
///
/// Runs of whitespace collapse to a single space.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-cases the values of every text column.
///
/// Columns registered as numeric or date, and the measure column, are
/// skipped, as is the generated calendar whose abbreviations are upper case.
/// Whitespace-only cells are kept as they are. Returns the number of cells
/// changed.
pub fn title_case_columns(table: &mut Table, configured_measure: &str) -> Result<usize> {
    if schema_for(&table.name).is_some_and(|schema| schema.kind == TableKind::Calendar) {
        return Ok(0);
    }
    let measure = measure_column(&table.name, configured_measure).to_string();
    let mut changed = 0;
    for column in table.column_names() {
        if column == measure {
            continue;
        }
        match registered_type(&table.name, &column) {
            Some(ColumnType::Text) | None => {}
            Some(_) => continue,
        }
        if table.column(&column).map(Column::dtype) != Some(&DataType::String) {
            continue;
        }
        let mut column_changed = 0;
        let (values, _) = map_cells(table, &column, |value| {
            let text = any_as_str(&value)?;
            let cased = title_case(text);
            if text.trim().is_empty() || cased == text {
                return Some(text.to_string());
            }
            column_changed += 1;
            Some(cased)
        })?;
        if column_changed > 0 {
            table.set_column(Series::new(column.as_str().into(), values))?;
            changed += column_changed;
        }
    }
    if changed > 0 {
        tracing::debug!(table = %table.name, cells = changed, "title-cased text cells");
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("PALE  lager"), "Pale Lager");
        assert_eq!(title_case(" north-east "), "North-east");
        assert_eq!(title_case("000 litres"), "000 Litres");
        assert_eq!(title_case("ÉCOSSE"), "Écosse");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn only_text_columns_change() {
        let mut table = Table::from_strings(
            "Subcategories",
            &["id", "Name", "Category_ID", "Notes"],
            &[&["1", "craft ALE", "2", "some NOTE"], &["2", "Stout", "2", ""]],
        )
        .unwrap();
        let changed = title_case_columns(&mut table, "Volume").unwrap();
        assert_eq!(changed, 2);
        assert_eq!(table.field(0, "Name").as_deref(), Some("Craft Ale"));
        assert_eq!(table.field(0, "Notes").as_deref(), Some("Some Note"));
        assert_eq!(table.value(1, "Notes"), Some(AnyValue::Null));
        assert_eq!(title_case_columns(&mut table, "Volume").unwrap(), 0);
    }

    #[test]
    fn whitespace_cells_are_kept() {
        let mut table = Table::from_strings("Extra", &["Note"], &[&[" "], &["a  b"]]).unwrap();
        assert_eq!(title_case_columns(&mut table, "Volume").unwrap(), 1);
        assert_eq!(table.fields("Note").unwrap(), vec![" ", "A B"]);
    }

    #[test]
    fn registered_measure_is_skipped_whatever_is_configured() {
        let mut table =
            Table::from_strings("Market_Sizes", &["Volume"], &[&["twelve"]]).unwrap();
        assert_eq!(title_case_columns(&mut table, "Amount").unwrap(), 0);
        assert_eq!(table.field(0, "Volume").as_deref(), Some("twelve"));
    }

    #[test]
    fn calendar_is_untouched() {
        let mut table = Table::from_strings("Date_Table", &["Month_MMM"], &[&["JUN"]]).unwrap();
        assert_eq!(title_case_columns(&mut table, "Volume").unwrap(), 0);
    }
}
