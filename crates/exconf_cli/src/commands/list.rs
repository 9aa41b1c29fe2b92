//! list-services and list-envs commands.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::open_resolver;

pub fn list_services(config_root: Option<&Path>) -> Result<()> {
    let names = open_resolver(config_root)?.list_services()?;
    print_names(&names, "No services found");
    Ok(())
}

pub fn list_envs(config_root: Option<&Path>) -> Result<()> {
    let names = open_resolver(config_root)?.list_environments()?;
    print_names(&names, "No environments found");
    Ok(())
}

fn print_names(names: &[String], empty_message: &str) {
    if names.is_empty() {
        println!("{}", empty_message.yellow());
    }
    for name in names {
        println!("{}", name.as_str().green());
    }
}
