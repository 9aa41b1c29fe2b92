//! Execute command - Run the execution command in a fresh work directory.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use exconf_core::{prepare_work_dir, ResolveRequest, Resolver};
use exconf_runner::{ExecutionResult, ShellRunner, SystemShell};

use super::{open_resolver, TargetArgs};

#[derive(Args)]
pub struct ExecuteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Leave placeholders without a value in place
    #[arg(short, long)]
    pub ignore_missing: bool,
}

/// Returns the exit code of the executed command.
pub fn execute(config_root: Option<&Path>, args: ExecuteArgs) -> Result<i32> {
    let resolver = open_resolver(config_root)?;
    let request = args
        .target
        .request()?
        .require_all_replaced(!args.ignore_missing);

    let result = run_in_work_dir(&resolver, &request, &SystemShell::default())?;
    info!(
        "Command finished with exit code {} in {} ms",
        result.exit_code, result.duration_ms
    );
    Ok(result.exit_code)
}

/// Materialize the templates into a temporary directory and run the
/// execution command there.
pub fn run_in_work_dir(
    resolver: &Resolver,
    request: &ResolveRequest,
    runner: &dyn ShellRunner,
) -> Result<ExecutionResult> {
    let prepared = prepare_work_dir(resolver, request, None)?;
    let command = prepared.execution_command()?;
    let result = runner
        .run(&prepared.path, command)
        .with_context(|| format!("Failed to run '{}' in {}", command, prepared.path.display()))?;
    Ok(result)
}
