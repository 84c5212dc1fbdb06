//! `sell-more-beer`: normalize beer-market extracts and load them.

use clap::Parser;
use smb_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{list_steps, run_pipeline, run_single_step};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::Run(args) => run_pipeline(args).map(|report| print_summary(&report)),
        Command::Step(args) => run_single_step(args).map(|report| print_summary(&report)),
        Command::Steps => list_steps(),
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
