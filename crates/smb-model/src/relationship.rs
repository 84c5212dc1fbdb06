//! Foreign-key relationship declarations.
//!
//! These describe the metadata-only tables declared after the bulk load.
//! SQLite does not check rows that already exist when such a table is
//! created, so the declarations document relationships without enforcing
//! them on loaded data.

use crate::schema::{
    CATEGORIES, CATEGORY, CHANNEL_VOLUME, COMPANY_SHARE, ColumnType, DATE, DATE_TABLE, DATE_YEAR,
    ID, LOCATION, LOCATIONS, MARKET_SIZES, SUBCATEGORIES, SUBCATEGORY, SUBCATEGORY_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub ty: ColumnType,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        ty: ColumnType,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        Self {
            column,
            ty,
            references_table,
            references_column,
        }
    }

    pub fn is_date_key(&self) -> bool {
        self.references_table == DATE_TABLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipTable {
    pub name: &'static str,
    pub keys: &'static [ForeignKey],
}

const DATE_KEY: ForeignKey = ForeignKey::new(DATE_YEAR, ColumnType::Integer, DATE_TABLE, DATE);

/// The three declarations, named after the fact tables they describe.
///
/// The names collide with the fact tables loaded from files of the same
/// name, so a declaration only materializes when its fact file was absent.
pub static RELATIONSHIPS: [RelationshipTable; 3] = [
    RelationshipTable {
        name: CHANNEL_VOLUME,
        keys: &[
            ForeignKey::new(CATEGORY, ColumnType::Text, CATEGORIES, CATEGORY),
            DATE_KEY,
        ],
    },
    RelationshipTable {
        name: MARKET_SIZES,
        keys: &[
            ForeignKey::new(SUBCATEGORY, ColumnType::Text, SUBCATEGORIES, SUBCATEGORY),
            ForeignKey::new(LOCATION, ColumnType::Text, LOCATIONS, LOCATION),
            DATE_KEY,
        ],
    },
    RelationshipTable {
        name: COMPANY_SHARE,
        keys: &[
            ForeignKey::new(SUBCATEGORY_ID, ColumnType::Integer, SUBCATEGORIES, ID),
            ForeignKey::new(LOCATION, ColumnType::Text, LOCATIONS, LOCATION),
            DATE_KEY,
        ],
    },
];

impl RelationshipTable {
    /// Keys to declare, optionally leaving out the date-dimension key.
    pub fn keys(&self, include_date_keys: bool) -> impl Iterator<Item = &ForeignKey> {
        self.keys
            .iter()
            .filter(move |key| include_date_keys || !key.is_date_key())
    }
}
