//! logchop -- scan Linux auditd, journald and syslog logs against detection rules.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use logchop_core::config::{GeneralConfig, LogchopConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(&logging_config(&cli)) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        return ExitCode::from(2);
    }
    logchop_core::metrics::describe_all();

    tracing::debug!(config = %cli.config.display(), "logchop starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, exit_code = e.exit_code(), "command failed");
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config;
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &config_path),
        Commands::Rules(args) => commands::rules::execute(args, &config_path),
        Commands::Config(args) => commands::config::execute(args, &config_path),
    }
}

/// Logging settings from the config file, with `--log-level` applied on top.
///
/// A broken config file falls back to defaults here; the command itself reports it.
fn logging_config(cli: &Cli) -> GeneralConfig {
    let mut general = LogchopConfig::load_or_default(&cli.config)
        .map(|config| config.general)
        .unwrap_or_default();
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    general
}
