//! Census Explorer CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use census_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use census_cli::logging::{LogConfig, LogFormat, init_logging};
use census_session::{ExplorerConfig, ExplorerError};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

mod commands;
mod progress;

use crate::commands::{run_config, run_datasets, run_options, run_show};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = config_from_cli(cli)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(async {
        match &cli.command {
            Command::Datasets => run_datasets(&config).await,
            Command::Show(args) => run_show(&config, args).await,
            Command::Options(scope) => run_options(&config, scope).await,
            Command::Config => run_config(&config),
        }
    })
}

/// Print the error chain, preferring the explorer's user-facing wording.
fn report(error: &anyhow::Error) {
    match error.downcast_ref::<ExplorerError>() {
        Some(explorer_error) => {
            eprintln!("error: {error}");
            eprintln!("  {}", explorer_error.user_message());
            if let Some(hint) = explorer_error.suggestion() {
                eprintln!("  hint: {hint}");
            }
        }
        None => eprintln!("error: {error:#}"),
    }
}

/// Configuration file (explicit path or the default location) with
/// command-line overrides applied on top.
fn config_from_cli(cli: &Cli) -> Result<ExplorerConfig> {
    let mut config = match &cli.config {
        Some(path) => ExplorerConfig::load_from(path)?,
        None => ExplorerConfig::load(),
    };
    if let Some(root) = &cli.data_root {
        config.data.root.clone_from(root);
    }
    if let Some(prefix) = &cli.base_prefix {
        config.data.base_prefix.clone_from(prefix);
    }
    #[cfg(feature = "http")]
    if let Some(url) = &cli.base_url {
        config.data.base_url = Some(url.clone());
    }
    if cli.no_prefetch {
        config.loading.prefetch = false;
    }
    Ok(config)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
