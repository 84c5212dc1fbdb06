//! SQL rendering for table loads and relationship declarations.

use std::collections::HashSet;

use polars::prelude::{AnyValue, DataType};
use rusqlite::types::Value as SqlValue;

use smb_common::{any_as_str, any_to_f64, any_to_field, any_to_i64, parse_f64_lenient, parse_i64};
use smb_model::{ColumnType, RelationshipTable, Table, measure_column, registered_type};

/// SQLite storage class declared for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
        }
    }
}

impl From<ColumnType> for SqlType {
    fn from(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Integer => SqlType::Integer,
            ColumnType::Decimal => SqlType::Real,
            ColumnType::Text | ColumnType::Date => SqlType::Text,
        }
    }
}

/// Quotes an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl From<&DataType> for SqlType {
    /// Storage class for an inferred column type. Anything that is not a
    /// number is stored as text.
    fn from(dtype: &DataType) -> Self {
        match dtype {
            dtype if dtype.is_integer() => SqlType::Integer,
            DataType::Boolean => SqlType::Integer,
            dtype if dtype.is_float() => SqlType::Real,
            _ => SqlType::Text,
        }
    }
}

/// Column types for a table: the measure column is always `REAL`, registered
/// columns use their registered type, the rest keep the type inferred when
/// the file was read.
///
/// The measure is the registered measure for known tables and
/// `configured_measure` for the rest.
pub fn column_types(table: &Table, configured_measure: &str) -> Vec<SqlType> {
    let measure = measure_column(&table.name, configured_measure);
    table
        .data
        .get_columns()
        .iter()
        .map(|column| {
            let name = column.name().as_str();
            if name == measure {
                return SqlType::Real;
            }
            match registered_type(&table.name, name) {
                Some(ty) => SqlType::from(ty),
                None => SqlType::from(column.dtype()),
            }
        })
        .collect()
}

/// Makes column names unique for `CREATE TABLE`, suffixing repeats with
/// `_2`, `_3`, ...
pub fn unique_columns(columns: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    columns
        .iter()
        .map(|column| {
            let mut name = column.clone();
            let mut n = 1;
            while !seen.insert(name.to_ascii_lowercase()) {
                n += 1;
                name = format!("{column}_{n}");
            }
            name
        })
        .collect()
}

/// `CREATE TABLE` statement for a loaded table.
pub fn create_table_sql(name: &str, columns: &[String], types: &[SqlType]) -> String {
    let defs = columns
        .iter()
        .zip(types)
        .map(|(column, ty)| format!("{} {}", quote_ident(column), ty.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({defs})", quote_ident(name))
}

pub fn insert_sql(name: &str, columns: &[String]) -> String {
    let names = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        quote_ident(name)
    )
}

/// Converts a cell to the SQLite value bound for a column of type `ty`.
///
/// Text that does not parse as the declared type is stored as text, which
/// SQLite's type affinity permits.
pub fn sql_value(value: AnyValue<'_>, ty: SqlType) -> SqlValue {
    if value.is_null() {
        return SqlValue::Null;
    }
    if let Some(text) = any_as_str(&value) {
        let parsed = match ty {
            SqlType::Integer => parse_i64(text).map(SqlValue::Integer),
            SqlType::Real => parse_f64_lenient(text).map(SqlValue::Real),
            SqlType::Text => None,
        };
        return parsed.unwrap_or_else(|| SqlValue::Text(text.to_string()));
    }
    let dtype = value.dtype();
    let number = match ty {
        SqlType::Integer if dtype.is_integer() => any_to_i64(value.clone()).map(SqlValue::Integer),
        SqlType::Integer | SqlType::Real if dtype.is_integer() || dtype.is_float() => {
            any_to_f64(value.clone()).map(SqlValue::Real)
        }
        _ => None,
    };
    number.unwrap_or_else(|| SqlValue::Text(any_to_field(value)))
}

/// `CREATE TABLE IF NOT EXISTS` statement declaring a relationship table.
pub fn relationship_sql(relationship: &RelationshipTable, include_date_keys: bool) -> String {
    let keys: Vec<_> = relationship.keys(include_date_keys).collect();
    let mut lines: Vec<String> = keys
        .iter()
        .map(|key| {
            format!(
                "    {} {}",
                quote_ident(key.column),
                SqlType::from(key.ty).as_str()
            )
        })
        .collect();
    lines.extend(keys.iter().map(|key| {
        format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            quote_ident(key.column),
            quote_ident(key.references_table),
            quote_ident(key.references_column)
        )
    }));
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        quote_ident(relationship.name),
        lines.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use smb_model::RELATIONSHIPS;

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("Market_Sizes"), "\"Market_Sizes\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn inferred_dtypes_map_to_storage_classes() {
        assert_eq!(SqlType::from(&DataType::Int64), SqlType::Integer);
        assert_eq!(SqlType::from(&DataType::Float64), SqlType::Real);
        assert_eq!(SqlType::from(&DataType::String), SqlType::Text);
        assert_eq!(SqlType::from(&DataType::Date), SqlType::Text);
    }

    #[test]
    fn registered_and_measure_types() {
        let data = df!(
            "Subcategory" => ["1"],
            "Location" => ["Leeds"],
            "Volume" => ["12,5"],
            "Extra" => [3i64],
        )
        .unwrap();
        let table = Table::new("Market_Sizes", data);
        let expected = vec![SqlType::Integer, SqlType::Text, SqlType::Real, SqlType::Integer];
        assert_eq!(column_types(&table, "Volume"), expected);
        // The registered measure stays REAL whatever is configured.
        assert_eq!(column_types(&table, "Extra"), expected);
    }

    #[test]
    fn configured_measure_applies_to_unregistered_tables() {
        let data = df!("Amount" => [3i64], "Share" => [0.5]).unwrap();
        let table = Table::new("Extra", data);
        assert_eq!(
            column_types(&table, "Amount"),
            vec![SqlType::Real, SqlType::Real]
        );
    }

    #[test]
    fn measure_binds_decimal_comma_as_real() {
        assert_eq!(sql_value(AnyValue::String("12,5"), SqlType::Real), SqlValue::Real(12.5));
        assert_eq!(
            sql_value(AnyValue::String("n/a"), SqlType::Integer),
            SqlValue::Text("n/a".into())
        );
        assert_eq!(sql_value(AnyValue::Null, SqlType::Text), SqlValue::Null);
    }

    #[test]
    fn typed_cells_follow_the_declared_type() {
        assert_eq!(sql_value(AnyValue::Int64(3), SqlType::Integer), SqlValue::Integer(3));
        assert_eq!(sql_value(AnyValue::Int64(3), SqlType::Real), SqlValue::Real(3.0));
        assert_eq!(sql_value(AnyValue::Int64(3), SqlType::Text), SqlValue::Text("3".into()));
        assert_eq!(sql_value(AnyValue::Float64(2.5), SqlType::Real), SqlValue::Real(2.5));
        assert_eq!(
            sql_value(AnyValue::Float64(2.5), SqlType::Text),
            SqlValue::Text("2,5".into())
        );
    }

    #[test]
    fn duplicate_columns_are_suffixed() {
        let columns = vec!["id".to_string(), "Name".to_string(), "name".to_string()];
        assert_eq!(unique_columns(&columns), vec!["id", "Name", "name_2"]);
    }

    #[test]
    fn create_and_insert_statements() {
        let columns = vec!["id".to_string(), "Name".to_string()];
        assert_eq!(
            create_table_sql("Categories", &columns, &[SqlType::Integer, SqlType::Text]),
            "CREATE TABLE \"Categories\" (\"id\" INTEGER, \"Name\" TEXT)"
        );
        assert_eq!(
            insert_sql("Categories", &columns),
            "INSERT INTO \"Categories\" (\"id\", \"Name\") VALUES (?1, ?2)"
        );
    }

    #[test]
    fn company_share_relationship_sql() {
        insta::assert_snapshot!(relationship_sql(&RELATIONSHIPS[2], true), @r#"
        CREATE TABLE IF NOT EXISTS "Company_Share_GBO_unit" (
            "Subcategory_ID" INTEGER,
            "Location" TEXT,
            "Date_year" INTEGER,
            FOREIGN KEY ("Subcategory_ID") REFERENCES "Subcategories"("id"),
            FOREIGN KEY ("Location") REFERENCES "Locations"("Location"),
            FOREIGN KEY ("Date_year") REFERENCES "Date_Table"("Date")
        )
        "#);
    }

    #[test]
    fn channel_volume_relationship_without_date_key() {
        insta::assert_snapshot!(relationship_sql(&RELATIONSHIPS[0], false), @r#"
        CREATE TABLE IF NOT EXISTS "Channel_Volume" (
            "Category" TEXT,
            FOREIGN KEY ("Category") REFERENCES "Categories"("Category")
        )
        "#);
    }
}
