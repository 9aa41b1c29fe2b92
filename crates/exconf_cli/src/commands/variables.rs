//! Variables command - Print the resolved variables.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use exconf_templates::VariableMap;

use super::{open_resolver, TargetArgs};

#[derive(Args)]
pub struct VariablesArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn execute(config_root: Option<&Path>, args: VariablesArgs) -> Result<()> {
    let resolver = open_resolver(config_root)?;
    let request = args.target.request()?;
    info!(
        "Resolving variables for service '{}' in env '{}'",
        request.service, request.environment
    );

    let session = resolver.resolve(&request)?;
    println!("{}", to_pretty_json(session.variables())?);
    Ok(())
}

/// Pretty-printed JSON with keys in sorted order.
pub fn to_pretty_json(variables: &VariableMap) -> Result<String> {
    serde_json::to_string_pretty(variables).context("Failed to serialize variables")
}
