//! Template command - Populate templates and print or write them.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use exconf_core::{prepare_work_dir, ResolutionSession};

use super::{open_resolver, TargetArgs};

#[derive(Args)]
pub struct TemplateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Leave placeholders without a value in place
    #[arg(short, long)]
    pub ignore_missing: bool,

    /// Write the populated templates into this directory
    #[arg(short, long, value_name = "DIR")]
    pub write_to_dir: Option<PathBuf>,
}

/// A populated template ready for display.
#[derive(Debug)]
pub struct RenderedTemplate {
    pub source: PathBuf,
    pub target_name: String,
    pub body: String,
}

pub fn execute(config_root: Option<&Path>, args: TemplateArgs) -> Result<()> {
    let resolver = open_resolver(config_root)?;
    let require_all_replaced = !args.ignore_missing;
    let request = args.target.request()?;

    if let Some(dir) = &args.write_to_dir {
        let request = request.require_all_replaced(require_all_replaced);
        let prepared = prepare_work_dir(&resolver, &request, Some(dir))?;
        for name in prepared.file_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    // Values resolve leniently; `-i` applies to template bodies.
    let session = resolver
        .resolve(&request.require_all_replaced(false))?
        .with_body_requirement(require_all_replaced)?;
    for rendered in render_templates(&session)? {
        println!("{}", format!("### {}", rendered.source.display()).blue());
        println!("{}", format!("### {} ###", rendered.target_name).blue());
        println!("{}", rendered.body);
        println!("{}", "### END ###".blue());
    }
    Ok(())
}

/// Populate every located template without writing anything.
pub fn render_templates(session: &ResolutionSession) -> Result<Vec<RenderedTemplate>> {
    let mut rendered = Vec::new();
    for source in session.list_template_files()? {
        let body = session.populate_template(&source)?;
        let target_name = session.target_file_name(&source)?;
        rendered.push(RenderedTemplate {
            source,
            target_name,
            body,
        });
    }
    Ok(rendered)
}
