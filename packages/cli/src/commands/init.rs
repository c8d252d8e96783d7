use crate::config::{Project, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use vantage_editor::EditorConfig;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Number of grid columns
    #[arg(long)]
    pub columns: Option<u32>,

    /// Keep undo history on disk next to each page
    #[arg(long)]
    pub persist_history: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, project: &Project) -> Result<()> {
    let config_path = project.config_path();

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Vantage pages...".bright_blue().bold());

    if !project.root.exists() {
        fs::create_dir_all(&project.root)?;
        println!("  {} Created {}/", "✓".green(), project.root.display());
    }

    let mut config = EditorConfig {
        persist_history: args.persist_history,
        ..EditorConfig::default()
    };
    if let Some(columns) = args.columns {
        config.layout.grid_columns = columns.max(1);
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Ready!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Save pages as <page-id>.json in {}", project.root.display());
    println!("  2. Run: vantage inspect <page-id>");

    Ok(())
}
