use super::load_page;
use crate::config::Project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use vantage_layout::{total_page_height, Breakpoint, GridGeometry};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Page id (file name without .json)
    pub page: String,

    /// Breakpoint whose placements are shown
    #[arg(short, long, default_value = "desktop")]
    pub breakpoint: Breakpoint,
}

pub async fn inspect(args: InspectArgs, project: &Project) -> Result<()> {
    let page = load_page(project, &args.page).await?;
    let doc = &page.document;
    let layout = &project.config.layout;

    println!("{} {}", "📄".bright_blue(), doc.page_id.bright_white().bold());
    if page.legacy {
        println!(
            "   {} stored in the legacy format, run {}",
            "⚠️".yellow(),
            format!("vantage migrate {}", args.page).cyan()
        );
    }
    println!(
        "   {} sections, {} elements, {}px tall",
        doc.sections.len(),
        doc.elements.len(),
        total_page_height(&doc.sections, layout.default_canvas_height)
    );
    println!();

    for section in &doc.sections {
        let grid = GridGeometry::for_section(Some(section), args.breakpoint, layout);
        let width = if section.full_width {
            "full width".to_string()
        } else {
            format!("{}px wide", grid.width)
        };
        println!(
            "{} {} ({}, {}px, {}x{} grid)",
            "▸".green(),
            section.id.bright_white(),
            width,
            section.height,
            grid.columns,
            grid.row_count()
        );

        let mut elements: Vec<_> = doc.elements_in_section(&section.id).collect();
        elements.sort_by_key(|el| el.z_index);
        if elements.is_empty() {
            println!("    {}", "(empty)".dimmed());
        }
        for element in elements {
            let css = element.layout.resolve(args.breakpoint).to_css();
            let inherited = if element.layout.stored(args.breakpoint).is_none() {
                " (desktop)".dimmed().to_string()
            } else {
                String::new()
            };
            println!(
                "    {} {} z={} column {} row {}{}",
                element.id.cyan(),
                element.element_type,
                element.z_index,
                css.grid_column,
                css.grid_row,
                inherited
            );
        }
    }

    Ok(())
}
