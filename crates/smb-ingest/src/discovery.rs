//! Working-set file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Returns true if the path carries a lowercase `.csv` extension.
///
/// `Categories.CSV` is not part of the working set.
pub fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "csv")
}

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename. Other extensions and subdirectories are
/// ignored.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        if is_csv(&path) {
            files.push(path);
        }
    }

    // Sort by filename
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Resolves a directory-or-file argument to the CSV files it names.
///
/// A directory yields its CSV files; a single `.csv` file yields itself; a
/// file with another extension yields nothing.
pub fn csv_targets(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        return list_csv_files(path);
    }
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if is_csv(path) {
        Ok(vec![path.to_path_buf()])
    } else {
        Ok(Vec::new())
    }
}

/// Table name for a CSV file: its base name with the extension stripped.
pub fn table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|v| v.to_str())
        .unwrap_or("")
        .to_string()
}
