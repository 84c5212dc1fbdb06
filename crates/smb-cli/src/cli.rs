//! CLI argument definitions for the beer-market pipeline.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use smb_cli::config::Preset;
use smb_cli::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "sell-more-beer",
    version,
    about = "Normalize beer-market CSV extracts and load them into SQLite",
    long_about = "Normalize beer-market CSV extracts and load them into SQLite.\n\n\
                  Every step rewrites the files of a working directory in place and\n\
                  is safe to run again on its own output."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging setup from the global flags. `--log-level` wins over `-v/-q`,
    /// and `RUST_LOG` is only consulted when neither is given.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.log_level.map(LevelFilter::from);
        let with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        LogConfig {
            level_filter: explicit.unwrap_or_else(|| self.verbosity.tracing_level_filter()),
            use_env_filter: explicit.is_none() && !self.verbosity.is_present(),
            with_ansi,
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            ..LogConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a preset or the steps listed in a config file.
    Run(RunArgs),

    /// Run a single step.
    Step(StepArgs),

    /// List the available steps and presets.
    Steps,
}

/// Overrides shared by `run` and `step`.
#[derive(Args, Clone, Default)]
pub struct ConfigArgs {
    /// TOML config file.
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory holding the CSV files.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Column-major reference file for the transpose step.
    #[arg(long = "reference", value_name = "FILE")]
    pub reference: Option<PathBuf>,

    /// SQLite database written by the load step.
    #[arg(long = "database", value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Report what would change without writing files or the database.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Ignore and do not update the stage ledger.
    #[arg(long = "no-ledger")]
    pub no_ledger: bool,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Step sequence to run, overriding the steps and preset of the config
    /// file.
    #[arg(long = "preset", value_enum)]
    pub preset: Option<Preset>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser)]
pub struct StepArgs {
    /// Step to run.
    #[arg(value_name = "STEP", value_enum)]
    pub step: StepArg,

    /// File or directory the step applies to, relative to the data directory.
    #[arg(long = "path", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Column to drop or rename.
    #[arg(long = "column", value_name = "NAME")]
    pub column: Option<String>,

    /// New name for `rename-column`.
    #[arg(long = "to", value_name = "NAME")]
    pub to: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StepArg {
    NormalizeDelimiters,
    DropBlankRows,
    Transpose,
    ReconcileDates,
    NormalizeNumbers,
    StandardizeUnits,
    TitleCase,
    DropColumn,
    RenameColumn,
    Conform,
    BuildDateTable,
    Load,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
