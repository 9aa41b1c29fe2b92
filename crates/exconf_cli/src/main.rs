//! exconf CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Template error
//! - 5: Shell runner error
//!
//! `execute` exits with the exit code of the executed command instead.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use exconf_core::CoreError;
use exconf_runner::RunnerError;
use exconf_templates::TemplateError;

mod commands;
mod logging;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIGURATION_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const RUNNER_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_root = cli.config_root.as_deref();
    let result = match cli.command {
        Commands::ListServices => commands::list::list_services(config_root),
        Commands::ListEnvs => commands::list::list_envs(config_root),
        Commands::Variables(args) => commands::variables::execute(config_root, args),
        Commands::Template(args) => commands::template::execute(config_root, args),
        Commands::Execute(args) => {
            return match commands::execute::execute(config_root, args) {
                Ok(code) => ExitCode::from(command_exit_code(code)),
                Err(e) => report(e),
            };
        }
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => report(e),
    }
}

fn report(e: anyhow::Error) -> ExitCode {
    eprintln!("{}", format!("Error: {:#}", e).red());
    ExitCode::from(categorize_error(&e))
}

/// Clamp a child exit code into the range a process can return.
fn command_exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(ExitCodes::GENERAL_ERROR)
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            return match err {
                CoreError::InvalidExtraVariable(_) => ExitCodes::INVALID_ARGS,
                CoreError::Template(_) | CoreError::TemplateFile { .. } => {
                    ExitCodes::TEMPLATE_ERROR
                }
                CoreError::Io(_) => ExitCodes::GENERAL_ERROR,
                _ => ExitCodes::CONFIGURATION_ERROR,
            };
        }
        if cause.downcast_ref::<TemplateError>().is_some() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if cause.downcast_ref::<RunnerError>().is_some() {
            return ExitCodes::RUNNER_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}
