//! Schema registry for the known beer-market tables.
//!
//! Each pipeline step looks a table up here by name instead of inspecting
//! runtime cell types. Tables and columns not listed fall back to content
//! inference in the step that needs a type.

use serde::{Deserialize, Serialize};

// Dimension tables
pub const CATEGORIES: &str = "Categories";
pub const SUBCATEGORIES: &str = "Subcategories";
pub const LOCATIONS: &str = "Locations";

// Fact tables
pub const CHANNEL_VOLUME: &str = "Channel_Volume";
pub const MARKET_SIZES: &str = "Market_Sizes";
pub const COMPANY_SHARE: &str = "Company_Share_GBO_unit";

// Generated calendar dimension
pub const DATE_TABLE: &str = "Date_Table";

// Shared column names
pub const ID: &str = "id";
pub const NAME: &str = "Name";
pub const REGION: &str = "Region";
pub const COUNTRY: &str = "Country";
pub const CATEGORY: &str = "Category";
pub const CATEGORY_ID: &str = "Category_ID";
pub const CATEGORY_NAME: &str = "Category_Name";
pub const SUBCATEGORY: &str = "Subcategory";
pub const SUBCATEGORY_ID: &str = "Subcategory_ID";
pub const SUBCATEGORY_NAME: &str = "Subcategory_Name";
pub const LOCATION: &str = "Location";
pub const YEAR: &str = "Year";
pub const YEAR_TEXT: &str = "Year_text";
pub const YEAR_DATE: &str = "Year_date";
pub const DATE: &str = "Date";
pub const DATE_YEAR: &str = "Date_year";
pub const UNIT: &str = "Unit";
pub const VOLUME: &str = "Volume";
pub const VOLUME_LITRES: &str = "Volume_Litres";

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    Integer,
    Decimal,
    Text,
    Date,
}

/// What a column means within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnRole {
    /// Surrogate key of a dimension.
    Key,
    /// Reference to another table's key.
    ForeignKey,
    /// The quantity of interest.
    Measure,
    /// Human-readable name.
    Label,
    /// Year or date.
    Temporal,
    Attribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
    Dimension,
    Fact,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub ty: ColumnType,
    pub role: ColumnRole,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, ty: ColumnType, role: ColumnRole) -> Self {
        Self { name, ty, role }
    }

    pub const fn key(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer, ColumnRole::Key)
    }

    pub const fn label(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text, ColumnRole::Label)
    }

    pub const fn foreign(name: &'static str, ty: ColumnType) -> Self {
        Self::new(name, ty, ColumnRole::ForeignKey)
    }

    pub const fn attribute(name: &'static str, ty: ColumnType) -> Self {
        Self::new(name, ty, ColumnRole::Attribute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub kind: TableKind,
    pub columns: &'static [ColumnSpec],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(|c| c.ty)
    }

    pub fn measure(&self) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|c| c.role == ColumnRole::Measure)
    }
}

const TEMPORAL: [ColumnSpec; 5] = [
    ColumnSpec::new(YEAR, ColumnType::Integer, ColumnRole::Temporal),
    ColumnSpec::new(YEAR_TEXT, ColumnType::Integer, ColumnRole::Temporal),
    ColumnSpec::new(YEAR_DATE, ColumnType::Date, ColumnRole::Temporal),
    ColumnSpec::new(DATE, ColumnType::Date, ColumnRole::Temporal),
    ColumnSpec::new(DATE_YEAR, ColumnType::Integer, ColumnRole::Temporal),
];

// =============================================================================
// Dimensions
// =============================================================================

pub static CATEGORIES_SCHEMA: TableSchema = TableSchema {
    name: CATEGORIES,
    kind: TableKind::Dimension,
    columns: &[ColumnSpec::key(ID), ColumnSpec::label(NAME)],
};

pub static SUBCATEGORIES_SCHEMA: TableSchema = TableSchema {
    name: SUBCATEGORIES,
    kind: TableKind::Dimension,
    columns: &[
        ColumnSpec::key(ID),
        ColumnSpec::label(NAME),
        ColumnSpec::foreign(CATEGORY_ID, ColumnType::Integer),
    ],
};

pub static LOCATIONS_SCHEMA: TableSchema = TableSchema {
    name: LOCATIONS,
    kind: TableKind::Dimension,
    columns: &[
        ColumnSpec::key(ID),
        ColumnSpec::label(REGION),
        ColumnSpec::label(NAME),
        ColumnSpec::attribute(COUNTRY, ColumnType::Text),
    ],
};

// =============================================================================
// Facts
// =============================================================================

pub static CHANNEL_VOLUME_SCHEMA: TableSchema = TableSchema {
    name: CHANNEL_VOLUME,
    kind: TableKind::Fact,
    columns: &[
        ColumnSpec::foreign(CATEGORY, ColumnType::Text),
        ColumnSpec::label(CATEGORY_NAME),
        ColumnSpec::label(SUBCATEGORY_NAME),
        TEMPORAL[0],
        TEMPORAL[1],
        TEMPORAL[2],
        TEMPORAL[3],
        TEMPORAL[4],
        ColumnSpec::new(VOLUME, ColumnType::Decimal, ColumnRole::Measure),
        ColumnSpec::attribute(UNIT, ColumnType::Text),
        ColumnSpec::attribute(VOLUME_LITRES, ColumnType::Integer),
    ],
};

pub static MARKET_SIZES_SCHEMA: TableSchema = TableSchema {
    name: MARKET_SIZES,
    kind: TableKind::Fact,
    columns: &[
        ColumnSpec::foreign(CATEGORY_ID, ColumnType::Integer),
        ColumnSpec::foreign(SUBCATEGORY, ColumnType::Integer),
        ColumnSpec::foreign(LOCATION, ColumnType::Text),
        ColumnSpec::label(CATEGORY_NAME),
        ColumnSpec::label(SUBCATEGORY_NAME),
        TEMPORAL[0],
        TEMPORAL[1],
        TEMPORAL[2],
        TEMPORAL[3],
        TEMPORAL[4],
        ColumnSpec::new(VOLUME, ColumnType::Decimal, ColumnRole::Measure),
        ColumnSpec::attribute(UNIT, ColumnType::Text),
        ColumnSpec::attribute(VOLUME_LITRES, ColumnType::Integer),
    ],
};

pub static COMPANY_SHARE_SCHEMA: TableSchema = TableSchema {
    name: COMPANY_SHARE,
    kind: TableKind::Fact,
    columns: &[
        ColumnSpec::foreign(CATEGORY_ID, ColumnType::Integer),
        ColumnSpec::foreign(SUBCATEGORY_ID, ColumnType::Integer),
        ColumnSpec::foreign(LOCATION, ColumnType::Text),
        ColumnSpec::label(CATEGORY_NAME),
        ColumnSpec::label(SUBCATEGORY_NAME),
        TEMPORAL[0],
        TEMPORAL[1],
        TEMPORAL[2],
        TEMPORAL[3],
        TEMPORAL[4],
        ColumnSpec::new(VOLUME, ColumnType::Decimal, ColumnRole::Measure),
        ColumnSpec::attribute(UNIT, ColumnType::Text),
        ColumnSpec::attribute(VOLUME_LITRES, ColumnType::Integer),
    ],
};

// =============================================================================
// Calendar
// =============================================================================

pub static DATE_TABLE_SCHEMA: TableSchema = TableSchema {
    name: DATE_TABLE,
    kind: TableKind::Calendar,
    columns: &[
        ColumnSpec::new(DATE, ColumnType::Date, ColumnRole::Key),
        ColumnSpec::attribute("Year", ColumnType::Integer),
        ColumnSpec::attribute("Quarter_Num", ColumnType::Integer),
        ColumnSpec::attribute("Quarter", ColumnType::Text),
        ColumnSpec::attribute("Month_Num", ColumnType::Integer),
        ColumnSpec::attribute("Month_Name", ColumnType::Text),
        ColumnSpec::attribute("Month_MMM", ColumnType::Text),
        ColumnSpec::attribute("WeekOfYear_Num", ColumnType::Integer),
        ColumnSpec::attribute("DayOfMonth_Num", ColumnType::Integer),
        ColumnSpec::attribute("DayOfWeek_Num", ColumnType::Integer),
        ColumnSpec::attribute("DayOfWeek_Name", ColumnType::Text),
        ColumnSpec::attribute("DayOfWeek_MMM", ColumnType::Text),
        ColumnSpec::attribute("DayOfYear_Num", ColumnType::Integer),
    ],
};

/// Every registered schema.
pub static REGISTRY: [&TableSchema; 7] = [
    &CATEGORIES_SCHEMA,
    &SUBCATEGORIES_SCHEMA,
    &LOCATIONS_SCHEMA,
    &CHANNEL_VOLUME_SCHEMA,
    &MARKET_SIZES_SCHEMA,
    &COMPANY_SHARE_SCHEMA,
    &DATE_TABLE_SCHEMA,
];

/// Looks a table up by name (the CSV file stem).
pub fn schema_for(table: &str) -> Option<&'static TableSchema> {
    REGISTRY.iter().copied().find(|schema| schema.name == table)
}

/// Measure column of `table`: the registered measure for known tables,
/// `configured` for the rest.
pub fn measure_column<'a>(table: &str, configured: &'a str) -> &'a str {
    schema_for(table)
        .and_then(TableSchema::measure)
        .map_or(configured, |column| column.name)
}

/// Registered type of `column` in `table`, if both are known.
pub fn registered_type(table: &str, column: &str) -> Option<ColumnType> {
    schema_for(table).and_then(|schema| schema.column_type(column))
}
