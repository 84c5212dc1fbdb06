//! Reading and rewriting a working directory through the public API.

use std::fs;

use tempfile::TempDir;

use smb_ingest::{
    Delimiter, StageLedger, fingerprint_file, list_csv_files, read_table, read_table_with,
    sniff_delimiter, write_table,
};
use smb_model::Stage;

#[test]
fn semicolon_file_is_rewritten_with_commas() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Market_Sizes.csv");
    fs::write(&path, "\u{feff}id;Volume;Unit\n1;12,5;000 litres\n").unwrap();

    assert_eq!(sniff_delimiter(&path).unwrap(), Delimiter::Semicolon);
    let table = read_table_with(&path, Delimiter::Semicolon.as_byte()).unwrap();
    assert_eq!(table.column_names(), vec!["id", "Volume", "Unit"]);
    write_table(&path, &table).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "id,Volume,Unit\n1,\"12,5\",000 litres\n"
    );
    assert_eq!(sniff_delimiter(&path).unwrap(), Delimiter::Comma);
    let back = read_table(&path).unwrap();
    assert_eq!(back.field(0, "Volume").as_deref(), Some("12,5"));
}

#[test]
fn ledger_tracks_files_across_rewrites() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Locations.csv");
    fs::write(&path, "id,Region\n1,North\n").unwrap();
    let original = fingerprint_file(&path).unwrap();

    let mut ledger = StageLedger::load(dir.path()).unwrap();
    ledger.record(&path, &original, &original, Stage::Transposed);
    ledger.save().unwrap();

    let ledger = StageLedger::load(dir.path()).unwrap();
    assert!(ledger.has_stage(&path, &original, Stage::Transposed));

    // An outside edit invalidates what the ledger knows.
    fs::write(&path, "id,Region\n1,South\n").unwrap();
    let edited = fingerprint_file(&path).unwrap();
    assert!(!ledger.has_stage(&path, &edited, Stage::Transposed));

    // The ledger sidecar is not part of the working set.
    let names: Vec<_> = list_csv_files(dir.path())
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["Locations.csv"]);
}
