//! Table transforms for the beer-market pipeline.
//!
//! Every function here is a pure `Table -> Table` rewrite operating in place
//! on an in-memory [`Table`](smb_model::Table). Reading and writing files is
//! the caller's job, so each transform can be tested without a filesystem.
//!
//! - **blank_rows**: drop rows whose every cell is null
//! - **orientation**: pivot the column-major locations extract into rows
//! - **temporal**: reconcile `Year`, `Year_text` and `Year_date`
//! - **numeric**: measure rounding and whole-number coercion
//! - **units**: rescale the measure into litres
//! - **text**: title-case text columns
//! - **schema_edit**: column drop/rename edits
//! - **conform**: denormalize dimension names into fact tables
//! - **calendar**: build the date dimension

pub mod blank_rows;
pub mod calendar;
mod cells;
pub mod conform;
pub mod datetime;
pub mod error;
pub mod numeric;
pub mod orientation;
pub mod schema_edit;
pub mod temporal;
pub mod text;
pub mod units;

pub use blank_rows::{drop_blank_rows, non_blank_mask};
pub use calendar::{build_date_dimension, date_range};
pub use conform::{Dimensions, conform};
pub use datetime::{parse_date, value_to_date};
pub use error::{Result, TransformError};
pub use numeric::normalize_numeric;
pub use orientation::{Orientation, fix_orientation, is_canonical};
pub use schema_edit::ColumnEdit;
pub use temporal::reconcile_temporal;
pub use text::{title_case, title_case_columns};
pub use units::standardize_units;

/// What a transform did to one table.
///
/// `applied` is false when the transform's precondition was not met (a
/// required column is absent, no recognized unit, already conformed) and the
/// table was left as it was. `nulls` counts non-null cells the transform
/// turned into nulls because they failed to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub applied: bool,
    pub nulls: usize,
}

impl Outcome {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn applied(nulls: usize) -> Self {
        Self {
            applied: true,
            nulls,
        }
    }
}
