//! Bulk load of a working directory into SQLite.
//!
//! Every CSV file becomes one table named after its file stem, replacing any
//! table of that name. All tables load inside a single transaction with
//! foreign keys off; the relationship tables are declared afterwards with
//! foreign keys on. SQLite checks foreign keys only on later writes, so rows
//! already loaded are never validated against them.

use std::path::Path;

use polars::prelude::AnyValue;
use rusqlite::{Connection, OptionalExtension, params_from_iter};

use smb_ingest::{list_csv_files, read_table_inferred};
use smb_model::schema::VOLUME;
use smb_model::{RELATIONSHIPS, Table};

use crate::error::{LoadError, Result};
use crate::sql::{
    column_types, create_table_sql, insert_sql, quote_ident, relationship_sql, sql_value,
    unique_columns,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Measure column of tables the schema registry does not list. Measures
    /// load as `REAL`, tolerating a decimal comma.
    pub measure_column: String,
    /// Declare `Date_year -> Date_Table(Date)` keys.
    pub include_date_keys: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            measure_column: VOLUME.to_string(),
            include_date_keys: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    pub name: String,
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: Vec<LoadedTable>,
    /// Relationship tables created by this load.
    pub declared: Vec<String>,
    /// Relationship tables skipped because a table of that name already
    /// existed, usually the fact table loaded from the file of the same name.
    pub shadowed: Vec<String>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

fn load_table(tx: &rusqlite::Transaction<'_>, table: &Table, options: &LoadOptions) -> Result<()> {
    let wrap = |source| LoadError::Table {
        table: table.name.clone(),
        source,
    };
    let names = table.column_names();
    let columns = unique_columns(&names);
    if columns != names {
        tracing::warn!(table = %table.name, "duplicate column names renamed for loading");
    }
    let types = column_types(table, &options.measure_column);

    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {};\n{};",
        quote_ident(&table.name),
        create_table_sql(&table.name, &columns, &types)
    ))
    .map_err(wrap)?;

    let mut stmt = tx.prepare(&insert_sql(&table.name, &columns)).map_err(wrap)?;
    let data = table.data.get_columns();
    for row in 0..table.height() {
        let values = data.iter().zip(&types).map(|(column, ty)| {
            sql_value(column.get(row).unwrap_or(AnyValue::Null), *ty)
        });
        stmt.execute(params_from_iter(values)).map_err(wrap)?;
    }
    Ok(())
}

/// Loads tables into an open connection, then declares the relationships.
pub fn load_tables(
    conn: &mut Connection,
    tables: &[Table],
    options: &LoadOptions,
) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    conn.execute_batch("PRAGMA foreign_keys = OFF;")
        .map_err(LoadError::Transaction)?;
    let tx = conn.transaction().map_err(LoadError::Transaction)?;
    for table in tables {
        let span = tracing::debug_span!("table", name = %table.name);
        let _guard = span.enter();
        load_table(&tx, table, options)?;
        tracing::debug!(rows = table.height(), "loaded");
        report.tables.push(LoadedTable {
            name: table.name.clone(),
            columns: table.width(),
            rows: table.height(),
        });
    }
    tx.commit().map_err(LoadError::Transaction)?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(LoadError::Transaction)?;
    for relationship in &RELATIONSHIPS {
        let wrap = |source| LoadError::Relationship {
            table: relationship.name.to_string(),
            source,
        };
        if table_exists(conn, relationship.name).map_err(wrap)? {
            tracing::debug!(
                table = relationship.name,
                "table already exists, relationship declaration skipped"
            );
            report.shadowed.push(relationship.name.to_string());
            continue;
        }
        conn.execute_batch(&relationship_sql(relationship, options.include_date_keys))
            .map_err(wrap)?;
        report.declared.push(relationship.name.to_string());
    }

    Ok(report)
}

/// Loads every CSV file of `dir` into the database at `db_path`.
///
/// Column types the schema registry does not fix come from Polars' schema
/// inference over the whole file.
pub fn load_directory(dir: &Path, db_path: &Path, options: &LoadOptions) -> Result<LoadReport> {
    let tables = list_csv_files(dir)?
        .iter()
        .map(|path| read_table_inferred(path))
        .collect::<smb_ingest::Result<Vec<_>>>()?;

    let mut conn = Connection::open(db_path).map_err(|source| LoadError::Open {
        path: db_path.to_path_buf(),
        source,
    })?;
    let report = load_tables(&mut conn, &tables, options)?;
    tracing::info!(
        database = %db_path.display(),
        tables = report.tables.len(),
        rows = report.total_rows(),
        "load complete"
    );
    Ok(report)
}
