//! Re-running a transform on its own output changes nothing.

use proptest::prelude::*;
use smb_model::{NumericOptions, Table, UnitTable};
use smb_transform::{
    ColumnEdit, Dimensions, conform, drop_blank_rows, normalize_numeric, reconcile_temporal,
    standardize_units,
};

/// Simulates a write/read cycle: every value goes through its CSV field text.
fn reparse(table: &Table) -> Table {
    let names = table.column_names();
    let columns: Vec<Vec<String>> = names
        .iter()
        .map(|name| table.fields(name).unwrap())
        .collect();
    let rows: Vec<Vec<String>> = (0..table.height())
        .map(|row| columns.iter().map(|column| column[row].clone()).collect())
        .collect();
    Table::from_records(table.name.clone(), &names, rows).unwrap()
}

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (0i64..5000).prop_map(|v| v.to_string()),
        (0i64..100_000, 0u32..1000).prop_map(|(a, b)| format!("{a},{b}")),
        (-500.0f64..500.0).prop_map(|v| format!("{v:.3}")),
        "[a-z]{1,6}",
    ]
}

fn year_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (1990i32..2030).prop_map(|y| y.to_string()),
        (1990i32..2030).prop_map(|y| format!("{y}.0")),
        "[a-z]{1,4}",
    ]
}

fn date_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (1990i32..2030, 1u32..13, 1u32..29).prop_map(|(y, m, d)| format!("{y}-{m:02}-{d:02}")),
        (1990i32..2030, 1u32..13, 1u32..29).prop_map(|(y, m, d)| format!("{d:02}/{m:02}/{y}")),
        Just("2020-02-29".to_string()),
        "[a-z]{3}",
    ]
}

fn fact_table() -> impl Strategy<Value = Table> {
    prop::collection::vec((cell(), year_cell(), date_cell(), cell()), 0..12).prop_map(|rows| {
        let header = ["Subcategory", "Year_text", "Year_date", "Volume"].map(String::from);
        let records = rows.into_iter().map(|(a, b, c, d)| vec![a, b, c, d]);
        Table::from_records("Market_Sizes", &header, records).unwrap()
    })
}

proptest! {
    #[test]
    fn blank_row_filter_is_idempotent(table in fact_table()) {
        let mut once = table;
        drop_blank_rows(&mut once).unwrap();
        let mut twice = reparse(&once);
        prop_assert_eq!(drop_blank_rows(&mut twice).unwrap(), 0);
        prop_assert_eq!(reparse(&once), reparse(&twice));
    }

    #[test]
    fn temporal_then_numeric_is_idempotent(table in fact_table()) {
        let options = NumericOptions::default();
        let mut once = table;
        reconcile_temporal(&mut once).unwrap();
        normalize_numeric(&mut once, &options).unwrap();
        let once = reparse(&once);

        let mut twice = once.clone();
        reconcile_temporal(&mut twice).unwrap();
        normalize_numeric(&mut twice, &options).unwrap();
        prop_assert_eq!(once, reparse(&twice));
    }

    #[test]
    fn schema_edits_are_idempotent(table in fact_table()) {
        let edits = [
            ColumnEdit::rename_column("Year_text", "Year"),
            ColumnEdit::drop_column("Subcategory"),
        ];
        let mut once = table;
        for edit in &edits {
            edit.apply(&mut once).unwrap();
        }
        let mut twice = reparse(&once);
        for edit in &edits {
            prop_assert!(!edit.apply(&mut twice).unwrap());
        }
        prop_assert_eq!(reparse(&once), twice);
    }
}

#[test]
fn units_and_conform_are_idempotent() {
    let categories =
        Table::from_strings("Categories", &["id", "Name"], &[&["1", "Beer"]]).unwrap();
    let subcategories = Table::from_strings(
        "Subcategories",
        &["id", "Name", "Category_ID"],
        &[&["10", "Lager", "1"]],
    )
    .unwrap();
    let dims = Dimensions {
        categories: Some(&categories),
        subcategories: Some(&subcategories),
    };
    let mut fact = Table::from_strings(
        "Market_Sizes",
        &["Subcategory", "Unit", "Volume"],
        &[&["10", "million litres", "1,5"], &["11", "000 litres", "2"]],
    )
    .unwrap();

    standardize_units(&mut fact, &UnitTable::default()).unwrap();
    conform(&mut fact, &dims).unwrap();
    let once = reparse(&fact);

    let mut again = once.clone();
    standardize_units(&mut again, &UnitTable::default()).unwrap();
    conform(&mut again, &dims).unwrap();
    assert_eq!(reparse(&again), once);
    assert_eq!(once.field(0, "Volume_Litres").as_deref(), Some("1500000"));
    assert_eq!(once.field(0, "Category_Name").as_deref(), Some("Beer"));
    assert_eq!(once.field(1, "Category_Name"), None);
}
