//! Configuration options for pipeline steps.

use serde::{Deserialize, Serialize};

use crate::schema::{DATE_TABLE, VOLUME, YEAR_DATE};

/// What happens to the measure column after 2-decimal rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurePolicy {
    /// Keep the rounded decimal value.
    #[default]
    KeepDecimal,
    /// Truncate the rounded value to a whole number.
    Truncate,
}

/// Options for the numeric normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericOptions {
    /// Measure column of tables the schema registry does not list.
    pub measure_column: String,
    pub measure_policy: MeasurePolicy,
    /// Decimal places kept on the measure.
    pub measure_decimals: u32,
}

impl Default for NumericOptions {
    fn default() -> Self {
        Self {
            measure_column: VOLUME.to_string(),
            measure_policy: MeasurePolicy::default(),
            measure_decimals: 2,
        }
    }
}

impl NumericOptions {
    pub fn with_policy(mut self, policy: MeasurePolicy) -> Self {
        self.measure_policy = policy;
        self
    }

    pub fn with_measure_column(mut self, column: impl Into<String>) -> Self {
        self.measure_column = column.into();
        self
    }
}

/// One unit label and the factor converting it to litres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub label: String,
    pub multiplier: f64,
}

impl UnitConversion {
    pub fn new(label: impl Into<String>, multiplier: f64) -> Self {
        Self {
            label: label.into(),
            multiplier,
        }
    }
}

/// Unit label to litre multiplier mapping.
///
/// Labels not in the table pass their volume through unscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTable {
    conversions: Vec<UnitConversion>,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self {
            conversions: vec![
                UnitConversion::new("000 litres", 1_000.0),
                UnitConversion::new("million litres", 1_000_000.0),
            ],
        }
    }
}

impl UnitTable {
    pub fn new(conversions: Vec<UnitConversion>) -> Self {
        Self { conversions }
    }

    /// Adds a label, replacing the multiplier of an existing one.
    pub fn insert(&mut self, conversion: UnitConversion) {
        match self
            .conversions
            .iter_mut()
            .find(|c| c.label == conversion.label)
        {
            Some(existing) => existing.multiplier = conversion.multiplier,
            None => self.conversions.push(conversion),
        }
    }

    /// Multiplier for a label, compared ASCII case-insensitively after trimming.
    ///
    /// Files that went through title-casing hold `000 Litres`.
    pub fn multiplier(&self, label: &str) -> Option<f64> {
        let label = label.trim();
        self.conversions
            .iter()
            .find(|c| c.label.eq_ignore_ascii_case(label))
            .map(|c| c.multiplier)
    }

    pub fn is_recognized(&self, label: &str) -> bool {
        self.multiplier(label).is_some()
    }

    pub fn conversions(&self) -> &[UnitConversion] {
        &self.conversions
    }
}

/// Options for the date dimension builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateDimensionOptions {
    /// Column scanned in every fact file.
    pub date_column: String,
    /// Name of the generated table (and its file stem).
    pub table_name: String,
}

impl Default for DateDimensionOptions {
    fn default() -> Self {
        Self {
            date_column: YEAR_DATE.to_string(),
            table_name: DATE_TABLE.to_string(),
        }
    }
}
