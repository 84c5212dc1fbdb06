//! Orientation fixing for the locations reference extract.
//!
//! The raw extract is column-major: its first column holds the attribute
//! labels (`id`, `Region`, `Country`, ...) and every further column describes
//! one location. The canonical form has one row per location.
//!
//! Detection is a shape heuristic: a canonical file has the literal `Region`
//! header in its second column, a raw file has a location there. A raw file
//! whose first location happens to be named `Region` is misread as
//! canonical.

use polars::prelude::*;

use smb_common::{any_as_str, any_to_field};
use smb_model::schema::{COUNTRY, REGION};
use smb_model::{Grid, Table, unique_column_names};

use crate::error::Result;

/// Result of [`fix_orientation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Orientation {
    /// The grid was already row-major. Holds the grid with its first column
    /// removed and the rows lacking a second-column value dropped. Nothing
    /// should be written back.
    AlreadyCanonical(Grid),
    /// The grid was pivoted into a table that replaces the file.
    Transposed(Table),
}

/// Whether any row carries the literal `Region` in its second column.
pub fn is_canonical(grid: &Grid) -> bool {
    let Some(second) = grid.get_columns().get(1) else {
        return false;
    };
    (0..second.len()).any(|idx| {
        second
            .get(idx)
            .is_ok_and(|value| any_as_str(&value).is_some_and(|s| s.trim() == REGION))
    })
}

/// Header names taken from the first row of the transposed grid.
fn header_names(transposed: &DataFrame) -> Vec<String> {
    unique_column_names(transposed.get_columns().iter().map(|column| {
        column
            .get(0)
            .map(|value| any_to_field(value).trim().to_string())
            .unwrap_or_default()
    }))
}

fn keep_canonical_rows(grid: Grid) -> Result<Grid> {
    let names: Vec<String> = grid
        .get_column_names_str()
        .into_iter()
        .map(str::to_string)
        .collect();
    if names.len() < 2 {
        return Ok(grid);
    }
    let keep = grid.column(&names[1])?.is_not_null();
    let mut trimmed = grid.filter(&keep)?;
    trimmed.drop_in_place(&names[0])?;
    Ok(trimmed)
}

/// Pivots a headerless grid into canonical row-major form.
///
/// After transposing, the first row (the former label column) becomes the
/// header. The `Country` column is dropped and rows without a `Region` are
/// removed.
pub fn fix_orientation(name: &str, grid: Grid) -> Result<Orientation> {
    if is_canonical(&grid) {
        return Ok(Orientation::AlreadyCanonical(keep_canonical_rows(grid)?));
    }
    if grid.width() == 0 {
        return Ok(Orientation::Transposed(Table::new(name, grid)));
    }

    let mut grid = grid;
    let transposed = grid.transpose(None, None)?;
    let header = header_names(&transposed);
    let mut data = transposed.slice(1, transposed.height().saturating_sub(1));
    data.set_column_names(header.as_slice())?;

    let mut table = Table::new(name, data);
    table.drop_column(COUNTRY);
    if let Some(region) = table.column(REGION) {
        let keep = region.is_not_null();
        let removed = table.filter_rows(&keep)?;
        if removed > 0 {
            tracing::debug!(table = name, removed, "dropped locations without a region");
        }
    }

    Ok(Orientation::Transposed(table))
}
