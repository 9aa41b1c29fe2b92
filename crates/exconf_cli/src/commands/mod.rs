//! CLI command definitions.
//!
//! Each subcommand maps to one operation on a configuration root.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use exconf_core::{parse_extra_vars, ConfigRoot, ResolveRequest, Resolver};

pub mod execute;
pub mod list;
pub mod template;
pub mod variables;

/// exconf - layered configuration and templating for service execution
#[derive(Parser)]
#[command(name = "exconf")]
#[command(version, about = "exconf - layered configuration and templating for service execution")]
#[command(long_about = r#"
exconf merges YAML variables from a configuration root (descriptor, global,
environment, service and service-in-environment layers), populates the
templates of the selected template type with them and runs the configured
execution command in the resulting work directory.

The configuration root is taken from -c, then EXCONF_CONFIG_ROOT, then the
current directory if it contains exconf.yaml.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Template error
  5 - Shell runner error

The execute command exits with the exit code of the executed command.
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the configuration root
    #[arg(short, long, global = true, value_name = "DIR")]
    pub config_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the services of the configuration root
    #[command(name = "list-services")]
    ListServices,

    /// List the environments of the configuration root
    #[command(name = "list-envs")]
    ListEnvs,

    /// Print the resolved variables as JSON
    Variables(variables::VariablesArgs),

    /// Populate the templates and print or write them
    Template(template::TemplateArgs),

    /// Prepare a work directory and run the execution command in it
    Execute(execute::ExecuteArgs),
}

/// Service and environment selection shared by the resolving commands.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Service name
    #[arg(short, long)]
    pub service: String,

    /// Environment name
    #[arg(short, long)]
    pub environment: String,

    /// Extra variable with the highest precedence (repeatable)
    #[arg(short = 'x', long = "extra-var", value_name = "KEY=VALUE")]
    pub extra_vars: Vec<String>,
}

impl TargetArgs {
    pub fn request(&self) -> Result<ResolveRequest> {
        let extra = parse_extra_vars(&self.extra_vars)?;
        Ok(ResolveRequest::new(&self.service, &self.environment).with_variables(extra))
    }
}

/// Open the configuration root and wrap it in a resolver.
pub fn open_resolver(config_root: Option<&Path>) -> Result<Resolver> {
    Ok(Resolver::new(ConfigRoot::discover(config_root)?))
}
