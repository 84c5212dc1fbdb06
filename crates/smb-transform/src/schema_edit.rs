//! Column drop and rename edits.

use std::fmt;

use smb_model::Table;

use crate::error::Result;

/// One schema edit applied to every table it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEdit {
    Drop { column: String },
    Rename { from: String, to: String },
}

impl ColumnEdit {
    pub fn drop_column(column: impl Into<String>) -> Self {
        Self::Drop {
            column: column.into(),
        }
    }

    pub fn rename_column(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Rename {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Applies the edit. Returns false, leaving the table untouched, when the
    /// column it names is absent.
    pub fn apply(&self, table: &mut Table) -> Result<bool> {
        match self {
            Self::Drop { column } => Ok(table.drop_column(column)),
            Self::Rename { from, to } if from == to => Ok(false),
            Self::Rename { from, to } => Ok(table.rename_column(from, to)?),
        }
    }
}

impl fmt::Display for ColumnEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop { column } => write!(f, "drop {column}"),
            Self::Rename { from, to } => write!(f, "rename {from} -> {to}"),
        }
    }
}
