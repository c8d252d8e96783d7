use super::load_page;
use crate::config::Project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use vantage_layout::{live_stylesheet, Breakpoint};

#[derive(Debug, Args)]
pub struct CssArgs {
    /// Page id (file name without .json)
    pub page: String,

    /// Render a single breakpoint instead of media queries
    #[arg(short, long)]
    pub breakpoint: Option<Breakpoint>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn css(args: CssArgs, project: &Project) -> Result<()> {
    let page = load_page(project, &args.page).await?;
    let stylesheet = live_stylesheet(&page.document, &project.config.layout, args.breakpoint);

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, stylesheet)?;
            eprintln!("  {} {} → {}", "✓".green(), args.page, path.display());
        }
        None => print!("{}", stylesheet),
    }

    Ok(())
}
