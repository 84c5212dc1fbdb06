//! In-memory table representation.
//!
//! A [`Table`] is one CSV file's contents held in a Polars [`DataFrame`] and
//! named after the file stem. Columns read from disk are `String` typed: an
//! empty field is null and every other field, whitespace included, is kept
//! verbatim as text.

use std::collections::HashSet;

use polars::prelude::*;

use smb_common::any_to_field;

use crate::error::{ModelError, Result};

/// Headerless rows, as read for the orientation fixer. Columns carry
/// generated names.
pub type Grid = DataFrame;

fn frame_error(table: &str, source: PolarsError) -> ModelError {
    ModelError::Frame {
        table: table.to_string(),
        source,
    }
}

/// Makes header names usable as column names.
///
/// Blank names become `Unnamed: <position>` and repeats of an earlier name
/// get a `.1`, `.2`, ... suffix.
pub fn unique_column_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            };
            let mut unique = base.clone();
            let mut n = 0;
            while !seen.insert(unique.clone()) {
                n += 1;
                unique = format!("{base}.{n}");
            }
            unique
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub data: DataFrame,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data.equals_missing(&other.data)
    }
}

impl Table {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Builds a table of `String` columns from raw CSV records.
    ///
    /// Records are padded with nulls or truncated to the header width.
    pub fn from_records<I, R, S>(
        name: impl Into<String>,
        header: &[String],
        records: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let name = name.into();
        let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
        for record in records {
            let record = record.as_ref();
            for (idx, column) in values.iter_mut().enumerate() {
                let field = record.get(idx).map(|f| f.as_ref()).unwrap_or_default();
                column.push((!field.is_empty()).then(|| field.to_string()));
            }
        }
        let columns = header
            .iter()
            .zip(values)
            .map(|(column, values)| Series::new(column.as_str().into(), values).into())
            .collect();
        let data = DataFrame::new(columns).map_err(|source| frame_error(&name, source))?;
        Ok(Self { name, data })
    }

    /// Builds a table from string rows, mapping empty fields to null.
    pub fn from_strings(name: impl Into<String>, columns: &[&str], rows: &[&[&str]]) -> Result<Self> {
        let header: Vec<String> = columns.iter().map(|c| (*c).to_string()).collect();
        Self::from_records(name, &header, rows.iter().copied())
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names_str()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.get_column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<AnyValue<'_>> {
        self.column(column)?.get(row).ok()
    }

    /// A cell as written to disk; `None` when null or absent.
    pub fn field(&self, row: usize, column: &str) -> Option<String> {
        self.value(row, column)
            .filter(|value| !value.is_null())
            .map(any_to_field)
    }

    /// Every cell of a column as written to disk, nulls as empty strings.
    pub fn fields(&self, column: &str) -> Option<Vec<String>> {
        let column = self.column(column)?;
        Some(
            (0..column.len())
                .map(|idx| column.get(idx).map_or_else(|_| String::new(), any_to_field))
                .collect(),
        )
    }

    /// Appends a column, or replaces the values of an existing one.
    pub fn set_column(&mut self, series: Series) -> Result<()> {
        if self.width() > 0 && series.len() != self.height() {
            return Err(ModelError::ColumnLength {
                table: self.name.clone(),
                column: series.name().to_string(),
                expected: self.height(),
                actual: series.len(),
            });
        }
        self.data
            .with_column(series)
            .map_err(|source| frame_error(&self.name, source))?;
        Ok(())
    }

    /// Removes a column. Returns false when absent.
    pub fn drop_column(&mut self, name: &str) -> bool {
        self.data.drop_in_place(name).is_ok()
    }

    /// Renames a column. Returns false when `from` is absent.
    ///
    /// If `to` already names another column, that column is removed first:
    /// the renamed column wins.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<bool> {
        if !self.has_column(from) {
            return Ok(false);
        }
        if from == to {
            return Ok(true);
        }
        self.drop_column(to);
        self.data
            .rename(from, to.into())
            .map_err(|source| frame_error(&self.name, source))?;
        Ok(true)
    }

    /// Keeps the rows where `keep` is true. Returns the number removed.
    pub fn filter_rows(&mut self, keep: &BooleanChunked) -> Result<usize> {
        let before = self.height();
        self.data = self
            .data
            .filter(keep)
            .map_err(|source| frame_error(&self.name, source))?;
        Ok(before - self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_strings(
            "Market_Sizes",
            &["Subcategory", "Year", "Volume"],
            &[&["1", "2020", "5,5"], &["2", "", "3"]],
        )
        .unwrap()
    }

    #[test]
    fn records_are_padded_to_header_width() {
        let header = vec!["a".to_string(), "b".to_string()];
        let table = Table::from_records("t", &header, [vec!["1"], vec!["2", "x", "extra"]]).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.field(0, "b"), None);
        assert_eq!(table.field(1, "b").as_deref(), Some("x"));
    }

    #[test]
    fn only_empty_fields_are_null() {
        let table = Table::from_strings("t", &["a", "b"], &[&["", " "]]).unwrap();
        assert_eq!(table.value(0, "a"), Some(AnyValue::Null));
        assert_eq!(table.field(0, "b").as_deref(), Some(" "));
    }

    #[test]
    fn column_names_are_made_unique() {
        let names = ["id", "", "Name", "Name", "id"].map(String::from);
        assert_eq!(
            unique_column_names(names),
            vec!["id", "Unnamed: 1", "Name", "Name.1", "id.1"]
        );
    }

    #[test]
    fn rename_replaces_existing_target() {
        let mut table = sample();
        assert!(table.rename_column("Subcategory", "Year").unwrap());
        assert_eq!(table.column_names(), vec!["Year", "Volume"]);
        assert_eq!(table.field(0, "Year").as_deref(), Some("1"));
        assert!(!table.rename_column("Missing", "Other").unwrap());
    }

    #[test]
    fn set_column_checks_length() {
        let mut table = sample();
        let err = table
            .set_column(Series::new("x".into(), [1i64]))
            .unwrap_err();
        assert!(matches!(err, ModelError::ColumnLength { expected: 2, actual: 1, .. }));
        table
            .set_column(Series::new("x".into(), [1i64, 2]))
            .unwrap();
        assert_eq!(table.width(), 4);
        assert_eq!(table.fields("x").unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn drop_and_filter() {
        let mut table = sample();
        assert!(table.drop_column("Year"));
        assert!(!table.drop_column("Year"));
        let keep = BooleanChunked::from_slice("keep".into(), &[true, false]);
        assert_eq!(table.filter_rows(&keep).unwrap(), 1);
        assert_eq!(table.column_names(), vec!["Subcategory", "Volume"]);
        assert_eq!(table.fields("Volume").unwrap(), vec!["5,5"]);
    }
}
