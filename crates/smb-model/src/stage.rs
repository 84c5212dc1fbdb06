//! Pipeline stage markers.
//!
//! A table's stage set records which transforms have already been applied to
//! it, so idempotence checks can consult explicit state before falling back
//! to sniffing the data's shape.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    DelimiterNormalized,
    BlankRowsDropped,
    Transposed,
    TemporalReconciled,
    NumericNormalized,
    UnitsStandardized,
    TitleCased,
    SchemaEdited,
    Conformed,
    DateDimension,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::DelimiterNormalized,
        Stage::BlankRowsDropped,
        Stage::Transposed,
        Stage::TemporalReconciled,
        Stage::NumericNormalized,
        Stage::UnitsStandardized,
        Stage::TitleCased,
        Stage::SchemaEdited,
        Stage::Conformed,
        Stage::DateDimension,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::DelimiterNormalized => "delimiter-normalized",
            Stage::BlankRowsDropped => "blank-rows-dropped",
            Stage::Transposed => "transposed",
            Stage::TemporalReconciled => "temporal-reconciled",
            Stage::NumericNormalized => "numeric-normalized",
            Stage::UnitsStandardized => "units-standardized",
            Stage::TitleCased => "title-cased",
            Stage::SchemaEdited => "schema-edited",
            Stage::Conformed => "conformed",
            Stage::DateDimension => "date-dimension",
        }
    }

    /// Stages whose transform is not safe to repeat blindly. A file with
    /// one of these recorded against its current contents is skipped
    /// without consulting the data.
    pub fn skips_when_recorded(self) -> bool {
        matches!(self, Stage::Transposed | Stage::Conformed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ModelError::UnknownStage(s.to_string()))
    }
}

pub type StageSet = BTreeSet<Stage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
        assert!("nope".parse::<Stage>().is_err());
    }

    #[test]
    fn only_shape_changing_stages_skip() {
        let skipping: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|stage| stage.skips_when_recorded())
            .collect();
        assert_eq!(skipping, vec![Stage::Transposed, Stage::Conformed]);
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&Stage::TemporalReconciled).unwrap();
        assert_eq!(json, "\"temporal-reconciled\"");
    }
}
