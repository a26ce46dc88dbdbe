//! pagecraft CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod data;

use commands::{Cli, Commands, LogFormat};
use config::ConfigError;
use pagecraft_source::SourceError;
use pagecraft_templates::TemplateError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let config = match cli.site_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            return ExitCode::from(categorize_error(&e));
        }
    };

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(args, config).await,
        Commands::Check(args) => commands::check::execute(args, config).await,
        Commands::Render(args) => commands::render::execute(args, config).await,
        Commands::Build(args) => commands::build::execute(args, config).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_directives = if cli.verbose {
        "pagecraft=debug,warn"
    } else if cli.quiet {
        "error"
    } else {
        "pagecraft=info,warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let json = cli.log_format == LogFormat::Json;
    let log_result = tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr)))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    // A missing page is a bad argument even when the renderer wrapped it.
    let missing_input = e
        .chain()
        .filter_map(|cause| cause.downcast_ref::<SourceError>())
        .any(SourceError::is_not_found);
    if missing_input {
        return ExitCodes::INVALID_ARGS;
    }

    for cause in e.chain() {
        if cause.is::<ConfigError>() {
            return ExitCodes::CONFIG_ERROR;
        }
        if cause.is::<TemplateError>() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if let Some(source_error) = cause.downcast_ref::<SourceError>() {
            return if source_error.is_not_found() {
                ExitCodes::INVALID_ARGS
            } else {
                ExitCodes::TEMPLATE_ERROR
            };
        }
    }

    ExitCodes::GENERAL_ERROR
}
