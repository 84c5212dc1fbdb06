//! Blank-row filtering.

use polars::prelude::*;

use smb_model::Table;

use crate::error::Result;

/// Rows holding at least one non-null cell.
///
/// A cell is null only when its field was empty: a row of spaces is kept.
pub fn non_blank_mask(table: &Table) -> BooleanChunked {
    table
        .data
        .get_columns()
        .iter()
        .map(Column::is_not_null)
        .reduce(|keep, column| &keep | &column)
        .unwrap_or_else(|| BooleanChunked::full("keep".into(), false, table.height()))
}

/// Removes fully blank rows, returning how many were dropped.
///
/// Partially blank rows are kept untouched.
pub fn drop_blank_rows(table: &mut Table) -> Result<usize> {
    let keep = non_blank_mask(table);
    let removed = table.filter_rows(&keep)?;
    if removed > 0 {
        tracing::debug!(table = %table.name, removed, "dropped blank rows");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn drops_only_fully_blank_rows() {
        let mut table = Table::from_strings(
            "Categories",
            &["id", "Name"],
            &[&["1", "Lager"], &["", ""], &["2", ""], &["", ""]],
        )
        .unwrap();
        assert_eq!(drop_blank_rows(&mut table).unwrap(), 2);
        assert_eq!(table.height(), 2);
        assert_eq!(table.field(1, "Name"), None);
    }

    #[test]
    fn whitespace_rows_and_cells_are_kept() {
        let mut table = Table::from_strings(
            "Extra",
            &["id", "Name", "Note"],
            &[&["1", "Lager", " "], &[" ", " ", " "]],
        )
        .unwrap();
        assert_eq!(drop_blank_rows(&mut table).unwrap(), 0);
        assert_eq!(table.height(), 2);
        assert_eq!(table.fields("Note").unwrap(), vec![" ", " "]);
    }

    #[test]
    fn second_pass_is_noop() {
        let mut table =
            Table::from_strings("Categories", &["id"], &[&["1"], &[""], &["3"]]).unwrap();
        drop_blank_rows(&mut table).unwrap();
        let once = table.clone();
        assert_eq!(drop_blank_rows(&mut table).unwrap(), 0);
        assert_eq!(table, once);
    }

    #[test]
    fn typed_values_are_not_blank() {
        let data = df!("a" => [None::<i64>, Some(0)], "b" => [None::<f64>, None]).unwrap();
        let table = Table::new("Extra", data);
        let keep: Vec<Option<bool>> = non_blank_mask(&table).into_iter().collect();
        assert_eq!(keep, vec![Some(false), Some(true)]);
    }
}
