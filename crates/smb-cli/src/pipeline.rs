//! Orchestration: read, transform and write each file.
//!
//! Transforms in `smb-transform` work on in-memory tables. This module owns
//! the file side: it picks the files a step applies to, reads them, runs
//! the transform and writes the result back only when the rendered bytes
//! differ from what is on disk. Every write is recorded in the stage ledger.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, debug_span, info, info_span, warn};

use smb_ingest::{
    Delimiter, StageLedger, csv_targets, fingerprint, list_csv_files, read_bytes, read_grid,
    read_table, read_table_with, render_table, sniff_delimiter, table_name, write_bytes,
};
use smb_load::{LoadOptions, load_directory};
use smb_model::schema::{CATEGORIES, SUBCATEGORIES};
use smb_model::{DateDimensionOptions, NumericOptions, Stage, Table, UnitTable};
use smb_transform::{
    ColumnEdit, Dimensions, Orientation, Outcome, build_date_dimension, conform, date_range,
    drop_blank_rows, fix_orientation, normalize_numeric, reconcile_temporal, standardize_units,
    title_case_columns,
};

use crate::config::{PipelineConfig, Step};
use crate::types::{RunReport, StepReport};

/// Resolved inputs of a run.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub data_dir: PathBuf,
    pub reference_file: PathBuf,
    pub database: PathBuf,
    pub numeric: NumericOptions,
    pub units: UnitTable,
    pub dates: DateDimensionOptions,
    pub load: LoadOptions,
}

impl PipelineContext {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            reference_file: config.reference_path(),
            database: config.database.clone(),
            numeric: config.numeric_options(),
            units: config.unit_table(),
            dates: config.date_options(),
            load: config.load_options(),
        }
    }

    /// CSV files named by an optional path relative to the data directory.
    fn targets(&self, path: Option<&Path>) -> Result<Vec<PathBuf>> {
        let root = match path {
            Some(p) if p.is_relative() => self.data_dir.join(p),
            Some(p) => p.to_path_buf(),
            None => self.data_dir.clone(),
        };
        csv_targets(&root).with_context(|| format!("resolve {}", root.display()))
    }

    fn all_files(&self) -> Result<Vec<PathBuf>> {
        self.targets(None)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// File-side state of a run: the ledger and whether writes happen at all.
struct Files {
    ledger: Option<StageLedger>,
    dry_run: bool,
}

impl Files {
    fn is_recorded(&self, path: &Path, current: &str, stage: Stage) -> bool {
        self.ledger
            .as_ref()
            .is_some_and(|ledger| ledger.has_stage(path, current, stage))
    }

    /// Writes `rendered` over `path` if it differs from `original`, and
    /// records the stage. Returns whether the file changed.
    fn commit(
        &mut self,
        path: &Path,
        original: &[u8],
        rendered: &[u8],
        stage: Stage,
    ) -> Result<bool> {
        let changed = original != rendered;
        if self.dry_run {
            if changed {
                info!(file = %file_label(path), "would rewrite (dry run)");
            }
            return Ok(changed);
        }
        if changed {
            write_bytes(path, rendered)?;
            info!(file = %file_label(path), "rewrote");
        } else {
            debug!(file = %file_label(path), "already up to date");
        }
        if let Some(ledger) = self.ledger.as_mut() {
            ledger.record(path, &fingerprint(original), &fingerprint(rendered), stage);
        }
        Ok(changed)
    }

    /// Reads each target as a table, applies `transform` and commits the
    /// result.
    fn rewrite_each<F>(
        &mut self,
        report: &mut StepReport,
        targets: &[PathBuf],
        stage: Stage,
        mut transform: F,
    ) -> Result<()>
    where
        F: FnMut(&mut Table) -> Result<Outcome>,
    {
        for path in targets {
            let span = debug_span!("file", file = %file_label(path));
            let _guard = span.enter();
            report.examined += 1;

            let original = read_bytes(path)?;
            if stage.skips_when_recorded()
                && self.is_recorded(path, &fingerprint(&original), stage)
            {
                debug!(%stage, "already applied according to the ledger");
                continue;
            }

            let mut table = read_table(path)?;
            let outcome = transform(&mut table)?;
            if outcome.nulls > 0 {
                warn!(count = outcome.nulls, "values could not be parsed and were set to null");
                report.nulls += outcome.nulls;
            }
            if !outcome.applied {
                debug!("nothing to do");
                continue;
            }
            let rendered = render_table(&table)?;
            if self.commit(path, &original, &rendered, stage)? {
                report.rewritten += 1;
            }
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        match &self.ledger {
            Some(ledger) if !self.dry_run => ledger
                .save()
                .with_context(|| format!("save ledger {}", ledger.path().display())),
            _ => Ok(()),
        }
    }
}

/// Runs steps against one working directory.
pub struct Pipeline {
    ctx: PipelineContext,
    files: Files,
}

impl Pipeline {
    /// Creates a pipeline, loading the stage ledger when `use_ledger` is set.
    pub fn new(ctx: PipelineContext, use_ledger: bool, dry_run: bool) -> Result<Self> {
        let ledger = if use_ledger {
            Some(StageLedger::load(&ctx.data_dir).context("load stage ledger")?)
        } else {
            None
        };
        Ok(Self {
            ctx,
            files: Files { ledger, dry_run },
        })
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<RunReport> {
        let mut report = RunReport {
            steps: Vec::with_capacity(steps.len()),
            dry_run: self.files.dry_run,
        };
        for step in steps {
            report.steps.push(self.run_step(step)?);
        }
        Ok(report)
    }

    pub fn run_step(&mut self, step: &Step) -> Result<StepReport> {
        let span = info_span!("step", step = %step);
        let _guard = span.enter();
        let mut report = StepReport::new(step.to_string());

        self.dispatch(step, &mut report)
            .with_context(|| format!("step '{step}' failed"))?;
        self.files.save()?;

        info!(
            examined = report.examined,
            rewritten = report.rewritten,
            nulls = report.nulls,
            "step complete"
        );
        Ok(report)
    }

    fn dispatch(&mut self, step: &Step, report: &mut StepReport) -> Result<()> {
        let ctx = &self.ctx;
        let files = &mut self.files;
        match step {
            Step::NormalizeDelimiters => normalize_delimiters(ctx, files, report),
            Step::DropBlankRows { path } => {
                let targets = ctx.targets(path.as_deref())?;
                files.rewrite_each(report, &targets, Stage::BlankRowsDropped, |table| {
                    drop_blank_rows(table)?;
                    Ok(Outcome::applied(0))
                })
            }
            Step::Transpose => transpose(ctx, files, report),
            Step::ReconcileDates => {
                let targets = ctx.all_files()?;
                files.rewrite_each(report, &targets, Stage::TemporalReconciled, |table| {
                    Ok(reconcile_temporal(table)?)
                })
            }
            Step::NormalizeNumbers => {
                let targets = ctx.all_files()?;
                files.rewrite_each(report, &targets, Stage::NumericNormalized, |table| {
                    Ok(normalize_numeric(table, &ctx.numeric)?)
                })
            }
            Step::StandardizeUnits => {
                let targets = ctx.all_files()?;
                files.rewrite_each(report, &targets, Stage::UnitsStandardized, |table| {
                    Ok(standardize_units(table, &ctx.units)?)
                })
            }
            Step::TitleCase => {
                let targets = ctx.all_files()?;
                let measure = ctx.numeric.measure_column.as_str();
                files.rewrite_each(report, &targets, Stage::TitleCased, |table| {
                    Ok(match title_case_columns(table, measure)? {
                        0 => Outcome::skipped(),
                        _ => Outcome::applied(0),
                    })
                })
            }
            Step::DropColumn { column, path } => {
                let edit = ColumnEdit::drop_column(column.as_str());
                schema_edit(ctx, files, report, &edit, path.as_deref())
            }
            Step::RenameColumn { from, to, path } => {
                let edit = ColumnEdit::rename_column(from.as_str(), to.as_str());
                schema_edit(ctx, files, report, &edit, path.as_deref())
            }
            Step::Conform => conform_facts(ctx, files, report),
            Step::BuildDateTable => build_date_table(ctx, files, report),
            Step::Load => load(ctx, files, report),
        }
    }
}

fn normalize_delimiters(
    ctx: &PipelineContext,
    files: &mut Files,
    report: &mut StepReport,
) -> Result<()> {
    for path in ctx.all_files()? {
        let span = debug_span!("file", file = %file_label(&path));
        let _guard = span.enter();
        report.examined += 1;

        let delimiter = sniff_delimiter(&path)?;
        if delimiter != Delimiter::Semicolon {
            debug!(?delimiter, "left as is");
            continue;
        }
        let original = read_bytes(&path)?;
        let table = read_table_with(&path, delimiter.as_byte())?;
        let rendered = render_table(&table)?;
        if files.commit(&path, &original, &rendered, Stage::DelimiterNormalized)? {
            report.rewritten += 1;
        }
    }
    Ok(())
}

/// Pivots the reference file. An already row-major file is reported and
/// left on disk as it is.
fn transpose(ctx: &PipelineContext, files: &mut Files, report: &mut StepReport) -> Result<()> {
    let path = &ctx.reference_file;
    let span = debug_span!("file", file = %file_label(path));
    let _guard = span.enter();
    if !path.is_file() {
        warn!(path = %path.display(), "reference file not found, nothing to transpose");
        return Ok(());
    }
    report.examined += 1;

    let original = read_bytes(path)?;
    if files.is_recorded(path, &fingerprint(&original), Stage::Transposed) {
        debug!("already transposed according to the ledger");
        return Ok(());
    }

    match fix_orientation(&table_name(path), read_grid(path)?)? {
        Orientation::AlreadyCanonical(grid) => {
            info!(rows = grid.height(), "already row-major, file left as is");
        }
        Orientation::Transposed(table) => {
            let rendered = render_table(&table)?;
            if files.commit(path, &original, &rendered, Stage::Transposed)? {
                report.rewritten += 1;
            }
        }
    }
    Ok(())
}

fn schema_edit(
    ctx: &PipelineContext,
    files: &mut Files,
    report: &mut StepReport,
    edit: &ColumnEdit,
    path: Option<&Path>,
) -> Result<()> {
    let targets = ctx.targets(path)?;
    files.rewrite_each(report, &targets, Stage::SchemaEdited, |table| {
        Ok(if edit.apply(table)? {
            Outcome::applied(0)
        } else {
            Outcome::skipped()
        })
    })
}

fn read_dimension(dir: &Path, name: &str) -> Result<Option<Table>> {
    let path = dir.join(format!("{name}.csv"));
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(read_table(&path)?))
}

fn conform_facts(
    ctx: &PipelineContext,
    files: &mut Files,
    report: &mut StepReport,
) -> Result<()> {
    let categories = read_dimension(&ctx.data_dir, CATEGORIES)?;
    let subcategories = read_dimension(&ctx.data_dir, SUBCATEGORIES)?;
    let dims = Dimensions {
        categories: categories.as_ref(),
        subcategories: subcategories.as_ref(),
    };
    let targets = ctx.all_files()?;
    files.rewrite_each(report, &targets, Stage::Conformed, |table| {
        Ok(conform(table, &dims)?)
    })
}

fn build_date_table(
    ctx: &PipelineContext,
    files: &mut Files,
    report: &mut StepReport,
) -> Result<()> {
    let options = &ctx.dates;
    let mut ranges = Vec::new();
    for path in ctx.all_files()? {
        if table_name(&path) == options.table_name {
            continue;
        }
        report.examined += 1;
        let table = read_table(&path)?;
        if !table.has_column(&options.date_column) {
            continue;
        }
        match date_range(&table, &options.date_column) {
            Some(range) => {
                debug!(file = %file_label(&path), from = %range.0, to = %range.1, "date range");
                ranges.push(range);
            }
            None => warn!(
                file = %file_label(&path),
                column = %options.date_column,
                "no parseable dates, file ignored"
            ),
        }
    }

    let calendar = build_date_dimension(&options.table_name, ranges)?;
    let path = ctx.data_dir.join(format!("{}.csv", options.table_name));
    let original = if path.is_file() {
        read_bytes(&path)?
    } else {
        Vec::new()
    };
    let rendered = render_table(&calendar)?;
    if !files.dry_run {
        if let Some(ledger) = files.ledger.as_mut() {
            ledger.forget(&path);
        }
    }
    if files.commit(&path, &original, &rendered, Stage::DateDimension)? {
        report.rewritten += 1;
    }
    info!(days = calendar.height(), "date table built");
    Ok(())
}

fn load(
    ctx: &PipelineContext,
    files: &mut Files,
    report: &mut StepReport,
) -> Result<()> {
    if files.dry_run {
        report.examined = list_csv_files(&ctx.data_dir)?.len();
        info!(database = %ctx.database.display(), "dry run, database not written");
        return Ok(());
    }
    let loaded = load_directory(&ctx.data_dir, &ctx.database, &ctx.load)?;
    report.examined = loaded.tables.len();
    report.load = Some(loaded);
    Ok(())
}
