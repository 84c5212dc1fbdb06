pub mod error;
pub mod options;
pub mod relationship;
pub mod schema;
pub mod stage;
pub mod table;

pub use error::{ModelError, Result};
pub use options::{
    DateDimensionOptions, MeasurePolicy, NumericOptions, UnitConversion, UnitTable,
};
pub use relationship::{ForeignKey, RELATIONSHIPS, RelationshipTable};
pub use schema::{
    ColumnRole, ColumnSpec, ColumnType, REGISTRY, TableKind, TableSchema, measure_column,
    registered_type, schema_for,
};
pub use stage::{Stage, StageSet};
pub use table::{Grid, Table, unique_column_names};
