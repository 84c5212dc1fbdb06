//! Pipeline configuration.
//!
//! A run is described by a [`PipelineConfig`], read from TOML or built from
//! a [`Preset`]. Relative paths in a config file resolve against the file's
//! directory.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use smb_load::LoadOptions;
use smb_model::schema::{COUNTRY, LOCATION, LOCATIONS, NAME};
use smb_model::{
    DateDimensionOptions, MeasurePolicy, NumericOptions, UnitConversion, UnitTable,
};

/// One pipeline step, in the order a run applies them.
///
/// Steps taking a `path` operate on that file or directory (relative to the
/// data directory) instead of the whole data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum Step {
    NormalizeDelimiters,
    DropBlankRows {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Transpose,
    ReconcileDates,
    NormalizeNumbers,
    StandardizeUnits,
    TitleCase,
    DropColumn {
        column: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    RenameColumn {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Conform,
    BuildDateTable,
    Load,
}

impl Step {
    /// Kebab-case step name, as written in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Step::NormalizeDelimiters => "normalize-delimiters",
            Step::DropBlankRows { .. } => "drop-blank-rows",
            Step::Transpose => "transpose",
            Step::ReconcileDates => "reconcile-dates",
            Step::NormalizeNumbers => "normalize-numbers",
            Step::StandardizeUnits => "standardize-units",
            Step::TitleCase => "title-case",
            Step::DropColumn { .. } => "drop-column",
            Step::RenameColumn { .. } => "rename-column",
            Step::Conform => "conform",
            Step::BuildDateTable => "build-date-table",
            Step::Load => "load",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::NormalizeDelimiters => "Rewrite semicolon-delimited files with commas",
            Step::DropBlankRows { .. } => "Remove rows with no non-empty field",
            Step::Transpose => "Pivot the column-major reference file into rows",
            Step::ReconcileDates => "Coerce years and force Year_date onto the stored year",
            Step::NormalizeNumbers => "Round the measure and truncate other numeric columns",
            Step::StandardizeUnits => "Add Volume_Litres from Volume and Unit",
            Step::TitleCase => "Title-case text columns",
            Step::DropColumn { .. } => "Drop a column where present",
            Step::RenameColumn { .. } => "Rename a column where present",
            Step::Conform => "Join dimension names into fact tables",
            Step::BuildDateTable => "Generate the date dimension from fact date ranges",
            Step::Load => "Load every CSV into SQLite and declare relationships",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::DropColumn { column, .. } => write!(f, "drop-column {column}"),
            Step::RenameColumn { from, to, .. } => write!(f, "rename-column {from} -> {to}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Built-in step sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Delimiter normalization and blank-row filtering only.
    #[default]
    Ingest,
    /// Every step, ending with the database load.
    Full,
}

impl Preset {
    pub fn steps(self) -> Vec<Step> {
        let ingest = vec![
            Step::NormalizeDelimiters,
            Step::DropBlankRows { path: None },
        ];
        match self {
            Preset::Ingest => ingest,
            Preset::Full => {
                let mut steps = ingest;
                steps.extend([
                    Step::Transpose,
                    Step::ReconcileDates,
                    Step::NormalizeNumbers,
                    Step::StandardizeUnits,
                    Step::TitleCase,
                    // Renames before drops.
                    Step::RenameColumn {
                        from: NAME.to_string(),
                        to: LOCATION.to_string(),
                        path: Some(PathBuf::from(format!("{LOCATIONS}.csv"))),
                    },
                    Step::DropColumn {
                        column: COUNTRY.to_string(),
                        path: None,
                    },
                    Step::Conform,
                    Step::BuildDateTable,
                    Step::Load,
                ]);
                steps
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Ingest => "ingest",
            Preset::Full => "full",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Working directory holding the CSV files.
    pub data_dir: PathBuf,
    /// Column-major reference file for the transpose step. Relative paths
    /// resolve against `data_dir`.
    pub reference_file: PathBuf,
    /// SQLite database written by the load step.
    pub database: PathBuf,
    pub measure_column: String,
    pub measure_policy: MeasurePolicy,
    /// Column scanned by the date dimension builder.
    pub date_column: String,
    /// Record applied stages in a sidecar ledger.
    pub ledger: bool,
    /// Declare `Date_year` foreign keys on the relationship tables.
    pub include_date_keys: bool,
    /// Extra unit labels on top of the built-in ones.
    pub units: Vec<UnitConversion>,
    /// Used when `steps` is empty.
    pub preset: Preset,
    pub steps: Vec<Step>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let numeric = NumericOptions::default();
        Self {
            data_dir: PathBuf::from("data"),
            reference_file: PathBuf::from(format!("{LOCATIONS}.csv")),
            database: PathBuf::from("data/sell_more_beer.db"),
            measure_column: numeric.measure_column,
            measure_policy: numeric.measure_policy,
            date_column: DateDimensionOptions::default().date_column,
            ledger: true,
            include_date_keys: true,
            units: Vec::new(),
            preset: Preset::default(),
            steps: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Reads a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config: PipelineConfig =
            toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Anchors relative `data_dir` and `database` paths at `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.data_dir.is_relative() {
            self.data_dir = base.join(&self.data_dir);
        }
        if self.database.is_relative() {
            self.database = base.join(&self.database);
        }
    }

    /// Steps to run: the explicit list, or the preset's.
    pub fn effective_steps(&self) -> Vec<Step> {
        if self.steps.is_empty() {
            self.preset.steps()
        } else {
            self.steps.clone()
        }
    }

    pub fn reference_path(&self) -> PathBuf {
        if self.reference_file.is_relative() {
            self.data_dir.join(&self.reference_file)
        } else {
            self.reference_file.clone()
        }
    }

    pub fn numeric_options(&self) -> NumericOptions {
        NumericOptions::default()
            .with_measure_column(self.measure_column.clone())
            .with_policy(self.measure_policy)
    }

    pub fn unit_table(&self) -> UnitTable {
        let mut units = UnitTable::default();
        for conversion in &self.units {
            units.insert(conversion.clone());
        }
        units
    }

    pub fn date_options(&self) -> DateDimensionOptions {
        DateDimensionOptions {
            date_column: self.date_column.clone(),
            ..DateDimensionOptions::default()
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            measure_column: self.measure_column.clone(),
            include_date_keys: self.include_date_keys,
        }
    }
}
