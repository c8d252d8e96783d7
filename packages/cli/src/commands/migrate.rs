use super::load_page;
use crate::config::Project;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use vantage_editor::PageStorage;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Page ids to migrate
    pub pages: Vec<String>,

    /// Migrate every page in the directory
    #[arg(short, long, conflicts_with = "pages")]
    pub all: bool,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn migrate(args: MigrateArgs, project: &Project) -> Result<()> {
    let pages = if args.all { project.page_ids()? } else { args.pages };
    if pages.is_empty() {
        return Err(anyhow!("No pages given (pass page ids or --all)"));
    }

    println!("{}", "🔧 Migrating pages to grid layout...".bright_blue().bold());

    let storage = project.storage();
    let mut migrated = 0;
    let mut error_count = 0;

    for page_id in &pages {
        let page = match load_page(project, page_id).await {
            Ok(page) => page,
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), page_id, e.to_string().red());
                continue;
            }
        };

        if !page.legacy {
            println!("  {} {} {}", "·".dimmed(), page_id, "(up to date)".dimmed());
            continue;
        }

        if !args.dry_run {
            if let Err(e) = storage.save(page_id, &page.document).await {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), page_id, e.to_string().red());
                continue;
            }
        }
        migrated += 1;
        println!(
            "  {} {} ({} elements)",
            "✓".green(),
            page_id,
            page.document.elements.len()
        );
    }

    println!();
    let verb = if args.dry_run { "Would migrate" } else { "Migrated" };
    if error_count == 0 {
        println!("{} {} {} of {} pages", "✅".green(), verb, migrated, pages.len());
        Ok(())
    } else {
        println!(
            "{} {} {} pages, {} errors",
            "⚠️".yellow(),
            verb,
            migrated,
            error_count
        );
        Err(anyhow!("{} pages failed to migrate", error_count))
    }
}
