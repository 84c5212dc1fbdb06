use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use comfy_table::Table;
use tracing::{info, info_span};

use smb_cli::config::{PipelineConfig, Preset, Step};
use smb_cli::pipeline::{Pipeline, PipelineContext};
use smb_cli::types::RunReport;

use crate::cli::{ConfigArgs, RunArgs, StepArg, StepArgs};
use crate::summary::apply_table_style;

const DATABASE_FILE_NAME: &str = "sell_more_beer.db";

/// Builds the run configuration: config file first, then flag overrides.
fn build_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
        if args.config.is_none() && args.database.is_none() {
            config.database = dir.join(DATABASE_FILE_NAME);
        }
    }
    if let Some(path) = &args.reference {
        config.reference_file = path.clone();
    }
    if let Some(path) = &args.database {
        config.database = path.clone();
    }
    if args.no_ledger {
        config.ledger = false;
    }
    Ok(config)
}

fn execute(config: &PipelineConfig, args: &ConfigArgs, steps: &[Step]) -> Result<RunReport> {
    let span = info_span!("run", data_dir = %config.data_dir.display());
    let _guard = span.enter();
    info!(steps = steps.len(), dry_run = args.dry_run, "starting");

    let ctx = PipelineContext::from_config(config);
    let mut pipeline = Pipeline::new(ctx, config.ledger, args.dry_run)?;
    pipeline.run(steps)
}

/// Steps of a run: a `--preset` flag wins over the config file.
fn steps_for(preset: Option<Preset>, config: &PipelineConfig) -> Vec<Step> {
    match preset {
        Some(preset) => preset.steps(),
        None => config.effective_steps(),
    }
}

pub fn run_pipeline(args: &RunArgs) -> Result<RunReport> {
    let config = build_config(&args.config)?;
    let steps = steps_for(args.preset, &config);
    execute(&config, &args.config, &steps)
}

pub fn run_single_step(args: &StepArgs) -> Result<RunReport> {
    let config = build_config(&args.config)?;
    let step = step_from_args(args)?;
    execute(&config, &args.config, &[step])
}

fn step_from_args(args: &StepArgs) -> Result<Step> {
    let column = || {
        args.column
            .clone()
            .ok_or_else(|| anyhow!("--column is required for this step"))
    };
    Ok(match args.step {
        StepArg::DropColumn => Step::DropColumn {
            column: column()?,
            path: args.path.clone(),
        },
        StepArg::RenameColumn => Step::RenameColumn {
            from: column()?,
            to: args
                .to
                .clone()
                .context("--to is required for rename-column")?,
            path: args.path.clone(),
        },
        other => placeholder_step(other, args.path.clone()),
    })
}

/// The step for an argument, with `<column>` standing in for column names.
fn placeholder_step(arg: StepArg, path: Option<std::path::PathBuf>) -> Step {
    match arg {
        StepArg::NormalizeDelimiters => Step::NormalizeDelimiters,
        StepArg::DropBlankRows => Step::DropBlankRows { path },
        StepArg::Transpose => Step::Transpose,
        StepArg::ReconcileDates => Step::ReconcileDates,
        StepArg::NormalizeNumbers => Step::NormalizeNumbers,
        StepArg::StandardizeUnits => Step::StandardizeUnits,
        StepArg::TitleCase => Step::TitleCase,
        StepArg::DropColumn => Step::DropColumn {
            column: "<column>".to_string(),
            path,
        },
        StepArg::RenameColumn => Step::RenameColumn {
            from: "<column>".to_string(),
            to: "<to>".to_string(),
            path,
        },
        StepArg::Conform => Step::Conform,
        StepArg::BuildDateTable => Step::BuildDateTable,
        StepArg::Load => Step::Load,
    }
}

pub fn list_steps() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Step", "Description"]);
    apply_table_style(&mut table);
    for arg in StepArg::value_variants() {
        let step = placeholder_step(*arg, None);
        table.add_row(vec![step.name(), step.description()]);
    }
    println!("{table}");

    let mut presets = Table::new();
    presets.set_header(vec!["Preset", "Steps"]);
    apply_table_style(&mut presets);
    for preset in Preset::value_variants() {
        let steps: Vec<String> = preset.steps().iter().map(ToString::to_string).collect();
        presets.add_row(vec![preset.name().to_string(), steps.join(", ")]);
    }
    println!("{presets}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn step_args(step: StepArg) -> StepArgs {
        StepArgs {
            step,
            path: None,
            column: None,
            to: None,
            config: ConfigArgs::default(),
        }
    }

    #[test]
    fn rename_needs_both_names() {
        let mut args = step_args(StepArg::RenameColumn);
        args.column = Some("Name".into());
        assert!(step_from_args(&args).is_err());
        args.to = Some("Location".into());
        assert_eq!(
            step_from_args(&args).unwrap(),
            Step::RenameColumn {
                from: "Name".into(),
                to: "Location".into(),
                path: None,
            }
        );
    }

    #[test]
    fn preset_flag_overrides_config_steps() {
        let config = PipelineConfig {
            steps: vec![Step::Conform],
            ..PipelineConfig::default()
        };
        assert_eq!(steps_for(Some(Preset::Ingest), &config), Preset::Ingest.steps());
        assert_eq!(steps_for(None, &config), vec![Step::Conform]);
        assert_eq!(
            steps_for(None, &PipelineConfig::default()),
            PipelineConfig::default().preset.steps()
        );
    }

    #[test]
    fn data_dir_flag_moves_the_database() {
        let args = ConfigArgs {
            data_dir: Some(PathBuf::from("extracts")),
            ..ConfigArgs::default()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.database, PathBuf::from("extracts/sell_more_beer.db"));
        assert_eq!(config.reference_path(), PathBuf::from("extracts/Locations.csv"));
    }
}
