//! Dimension conforming.
//!
//! Fact tables reference dimensions by surrogate id. Conforming copies the
//! human-readable names next to those ids with left joins: a fact row whose
//! key has no dimension row keeps nulls in the joined columns. Each join is
//! skipped when its target column already exists, so re-running is safe.

use std::collections::HashSet;

use polars::prelude::*;

use smb_common::any_key_string;
use smb_model::Table;
use smb_model::schema::{
    CATEGORIES, CATEGORY, CATEGORY_ID, CATEGORY_NAME, CHANNEL_VOLUME, COMPANY_SHARE, ID,
    MARKET_SIZES, NAME, SUBCATEGORIES, SUBCATEGORY, SUBCATEGORY_ID, SUBCATEGORY_NAME,
};

use crate::Outcome;
use crate::error::{Result, TransformError};

const ROW: &str = "__row";
const FACT_KEY: &str = "__fact_key";
const DIM_KEY: &str = "__dim_key";
const MATCHED: &str = "__matched";

/// Dimension tables available to the conformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimensions<'a> {
    pub categories: Option<&'a Table>,
    pub subcategories: Option<&'a Table>,
}

fn require<'a>(table: Option<&'a Table>, name: &str) -> Result<&'a Table> {
    table.ok_or_else(|| TransformError::MissingDimension(name.to_string()))
}

fn require_column<'a>(table: &'a Table, column: &str) -> Result<&'a Column> {
    table
        .column(column)
        .ok_or_else(|| TransformError::MissingColumn {
            table: table.name.clone(),
            column: column.to_string(),
        })
}

/// Normalized join keys of a column; see [`any_key_string`].
fn key_series(table: &Table, column: &str, name: &str) -> Result<Series> {
    let values = require_column(table, column)?;
    let mut keys = Vec::with_capacity(values.len());
    for idx in 0..values.len() {
        keys.push(any_key_string(values.get(idx)?));
    }
    Ok(Series::new(name.into(), keys))
}

/// The dimension's rows keyed by normalized `id`, one row per key. The first
/// row wins on duplicate ids; rows without an id are dropped.
fn keyed_dimension(dimension: &Table) -> Result<DataFrame> {
    let keys = key_series(dimension, ID, DIM_KEY)?;
    let mut seen = HashSet::new();
    let first: Vec<bool> = keys
        .str()?
        .into_iter()
        .map(|key| key.is_some_and(|k| seen.insert(k.to_string())))
        .collect();
    let mut keyed = dimension.data.clone();
    keyed.with_column(keys)?;
    Ok(keyed.filter(&BooleanChunked::from_slice("first".into(), &first))?)
}

/// Left-joins `columns` of `dimension` (as `(source, target)` pairs) onto
/// `fact` via `fact[key] = dimension.id`. Returns the number of fact rows
/// without a match.
///
/// Fact row order is kept and the targets are appended in the given order.
fn left_join(
    fact: &mut Table,
    key: &str,
    dimension: &Table,
    columns: &[(&str, &str)],
) -> Result<usize> {
    let fact_keys = key_series(fact, key, FACT_KEY)?;
    for (source, _) in columns {
        require_column(dimension, source)?;
    }

    let mut output = fact.column_names();
    output.extend(columns.iter().map(|(_, target)| target.to_string()));

    let mut selection = vec![col(DIM_KEY)];
    selection.extend(
        columns
            .iter()
            .map(|(source, target)| col(*source).alias(*target)),
    );
    selection.push(lit(true).alias(MATCHED));

    let mut left = fact.data.with_row_index(ROW.into(), None)?;
    left.with_column(fact_keys)?;
    let joined = left
        .lazy()
        .join(
            keyed_dimension(dimension)?.lazy().select(selection),
            [col(FACT_KEY)],
            [col(DIM_KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([ROW], SortMultipleOptions::default())
        .collect()?;

    let unmatched = joined.column(MATCHED)?.null_count();
    fact.data = joined.select(output)?;
    Ok(unmatched)
}

fn conform_by_subcategory(fact: &mut Table, key: &str, dims: &Dimensions<'_>) -> Result<Outcome> {
    let mut applied = false;
    let mut unmatched = 0;

    if !fact.has_column(SUBCATEGORY_NAME) {
        let subcategories = require(dims.subcategories, SUBCATEGORIES)?;
        let mut columns = vec![(NAME, SUBCATEGORY_NAME)];
        if !fact.has_column(CATEGORY_ID) {
            columns.insert(0, (CATEGORY_ID, CATEGORY_ID));
        }
        unmatched += left_join(fact, key, subcategories, &columns)?;
        applied = true;
    }

    if !fact.has_column(CATEGORY_NAME) {
        let categories = require(dims.categories, CATEGORIES)?;
        unmatched += left_join(fact, CATEGORY_ID, categories, &[(NAME, CATEGORY_NAME)])?;
        applied = true;
    }

    if unmatched > 0 {
        tracing::warn!(table = %fact.name, rows = unmatched, "fact keys without a dimension row");
    }
    Ok(if applied {
        Outcome::applied(0)
    } else {
        Outcome::skipped()
    })
}

/// Channel volumes carry a category label rather than a key, so they are
/// relabelled instead of joined.
fn relabel_channel_volume(fact: &mut Table) -> Result<Outcome> {
    if fact.has_column(CATEGORY_NAME) {
        return Ok(Outcome::skipped());
    }
    let labels = require_column(fact, CATEGORY)?
        .as_materialized_series()
        .clone()
        .with_name(SUBCATEGORY_NAME.into());
    fact.rename_column(CATEGORY, CATEGORY_NAME)?;
    fact.set_column(labels)?;
    Ok(Outcome::applied(0))
}

/// Conforms one fact table against the dimensions.
///
/// Tables other than the three known facts are skipped.
pub fn conform(fact: &mut Table, dims: &Dimensions<'_>) -> Result<Outcome> {
    match fact.name.as_str() {
        COMPANY_SHARE => conform_by_subcategory(fact, SUBCATEGORY_ID, dims),
        MARKET_SIZES => conform_by_subcategory(fact, SUBCATEGORY, dims),
        CHANNEL_VOLUME => relabel_channel_volume(fact),
        _ => Ok(Outcome::skipped()),
    }
}
