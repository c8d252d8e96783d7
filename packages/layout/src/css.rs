//! CSS translation for grid placements and the live-view stylesheet.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::model::{Breakpoint, GridPlacement, PageDocument, Section};

/// `grid-column` / `grid-row` values, 1-based with exclusive ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssPlacement {
    pub grid_column: String,
    pub grid_row: String,
}

impl GridPlacement {
    pub fn to_css(&self) -> CssPlacement {
        CssPlacement {
            grid_column: format!(
                "{} / {}",
                self.column_start.saturating_add(1),
                self.column_end.saturating_add(1)
            ),
            grid_row: format!("{} / {}", self.row_start.saturating_add(1), self.row_end.saturating_add(1)),
        }
    }
}

/// Mobile rules kick in a little above the mobile canvas width
const MOBILE_QUERY_FACTOR: f64 = 1.28;

fn section_rule(section: &Section, config: &LayoutConfig) -> String {
    let mut rule = format!(
        ".section-{} {{ position: relative; display: grid; grid-template-columns: repeat({}, 1fr); grid-template-rows: repeat({}, {}px); height: {}px; width: 100%; margin: 0 auto; }}\n",
        section.id,
        config.grid_columns,
        config.row_count(section.height),
        config.grid_row_height,
        section.height,
    );
    if !section.full_width {
        let max = section.max_width.unwrap_or(config.max_section_width);
        let width = section.width.unwrap_or(config.canvas_width(Breakpoint::Desktop)).min(max);
        rule.push_str(&format!(".section-{} {{ max-width: {}px; }}\n", section.id, width));
    }
    rule
}

fn element_rule(id: &str, placement: GridPlacement, z_index: Option<i64>) -> String {
    let css = placement.to_css();
    match z_index {
        Some(z) => format!(
            ".element-{} {{ grid-column: {}; grid-row: {}; z-index: {}; }}\n",
            id, css.grid_column, css.grid_row, z
        ),
        None => format!(".element-{} {{ grid-column: {}; grid-row: {}; }}\n", id, css.grid_column, css.grid_row),
    }
}

/// Stylesheet rendering `doc` on CSS grids.
///
/// With a fixed breakpoint every element uses that breakpoint's placement.
/// Without one, desktop placements are the base rules and stored tablet and
/// mobile placements become `max-width` media query overrides.
pub fn live_stylesheet(doc: &PageDocument, config: &LayoutConfig, breakpoint: Option<Breakpoint>) -> String {
    let mut css = format!(
        ".page-container {{ position: relative; width: 100%; max-width: {}px; margin: 0 auto; }}\n",
        config.canvas_width(Breakpoint::Desktop)
    );

    for section in &doc.sections {
        css.push_str(&section_rule(section, config));
    }

    let base = breakpoint.unwrap_or(Breakpoint::Desktop);
    for element in &doc.elements {
        css.push_str(&element_rule(&element.id, element.layout.resolve(base), Some(element.z_index)));
    }

    if breakpoint.is_some() {
        return css;
    }

    let queries = [
        (Breakpoint::Tablet, config.breakpoints.tablet),
        (Breakpoint::Mobile, config.breakpoints.mobile * MOBILE_QUERY_FACTOR),
    ];
    for (bp, max_width) in queries {
        let overrides: String = doc
            .elements
            .iter()
            .filter_map(|el| {
                let placement = el.layout.stored(bp)?;
                (placement != el.layout.desktop).then(|| element_rule(&el.id, placement, None))
            })
            .collect();
        if !overrides.is_empty() {
            css.push_str(&format!("@media (max-width: {}px) {{\n{}}}\n", max_width, overrides));
        }
    }

    css
}
