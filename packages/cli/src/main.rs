mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{css, init, inspect, migrate, CssArgs, InitArgs, InspectArgs, MigrateArgs};
use config::Project;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Vantage CLI - inspect and maintain grid-layout pages
#[derive(Parser, Debug)]
#[command(name = "vantage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding <page-id>.json files
    #[arg(short, long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Config file (defaults to vantage.config.json in --dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default config file
    Init(InitArgs),

    /// Summarize a stored page
    Inspect(InspectArgs),

    /// Emit the live-view stylesheet for a page
    Css(CssArgs),

    /// Convert legacy percent-layout pages to grid cells
    Migrate(MigrateArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let project = match &cli.command {
        // init must not fail on a broken config it is about to replace
        Command::Init(_) => Project {
            root: cli.dir.clone(),
            config: Default::default(),
        },
        _ => Project::load(&cli.dir, cli.config.as_deref())?,
    };

    match cli.command {
        Command::Init(args) => init(args, &project),
        Command::Inspect(args) => inspect(args, &project).await,
        Command::Css(args) => css(args, &project).await,
        Command::Migrate(args) => migrate(args, &project).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
