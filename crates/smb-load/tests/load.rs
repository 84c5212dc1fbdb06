//! Loading a working directory from disk.

use std::fs;

use rusqlite::Connection;
use smb_load::{LoadOptions, load_directory};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    fs::write(dir.path().join(name), contents).unwrap();
}

fn count(db: &std::path::Path, table: &str) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn loading_twice_replaces_tables() {
    let dir = TempDir::new().unwrap();
    write(&dir, "Categories.csv", "id,Name\n1,Beer\n2,Cider\n");
    write(
        &dir,
        "Channel_Volume.csv",
        "Category_Name,Year,Volume,Subcategory_Name\nBeer,2020,\"12,5\",Beer\n",
    );
    write(&dir, "notes.txt", "ignored");
    let db = dir.path().join("sell_more_beer.db");

    let first = load_directory(dir.path(), &db, &LoadOptions::default()).unwrap();
    let second = load_directory(dir.path(), &db, &LoadOptions::default()).unwrap();
    assert_eq!(first.tables, second.tables);
    assert_eq!(count(&db, "Categories"), 2);
    assert_eq!(count(&db, "Channel_Volume"), 1);
    assert_eq!(second.total_rows(), 3);

    // A shrinking file shrinks its table.
    write(&dir, "Categories.csv", "id,Name\n1,Beer\n");
    load_directory(dir.path(), &db, &LoadOptions::default()).unwrap();
    assert_eq!(count(&db, "Categories"), 1);
}

#[test]
fn relationship_tables_are_declared_once() {
    let dir = TempDir::new().unwrap();
    write(&dir, "Subcategories.csv", "id,Name,Category_ID\n10,Lager,1\n");
    let db = dir.path().join("store.db");

    let first = load_directory(dir.path(), &db, &LoadOptions::default()).unwrap();
    assert_eq!(first.declared.len(), 3);
    assert!(first.shadowed.is_empty());

    // Relationship tables persist across runs and are not recreated.
    let second = load_directory(dir.path(), &db, &LoadOptions::default()).unwrap();
    assert!(second.declared.is_empty());
    assert_eq!(second.shadowed.len(), 3);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = load_directory(
        &dir.path().join("missing"),
        &dir.path().join("x.db"),
        &LoadOptions::default(),
    );
    assert!(result.is_err());
}

#[test]
fn unregistered_columns_use_inferred_types() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "Extra.csv",
        "code,Share,Note,Day\n1,0.5,a,2020-01-01\n2,1.5,,2020-01-02\n",
    );
    let db = dir.path().join("store.db");
    load_directory(dir.path(), &db, &LoadOptions::default()).unwrap();

    let conn = Connection::open(&db).unwrap();
    let types: (String, String, String, String) = conn
        .query_row(
            "SELECT typeof(\"code\"), typeof(\"Share\"), typeof(\"Note\"), typeof(\"Day\") \
             FROM \"Extra\" WHERE \"code\" = 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(
        types,
        ("integer".into(), "real".into(), "text".into(), "text".into())
    );
    let note: Option<String> = conn
        .query_row("SELECT \"Note\" FROM \"Extra\" WHERE \"code\" = 2", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(note, None);
}
