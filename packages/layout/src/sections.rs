//! Section & page model operations.
//!
//! Every function takes the document by reference and returns a new one.
//! Unknown section ids leave the document unchanged.

use tracing::debug;

use crate::config::LayoutConfig;
use crate::ids;
use crate::model::{Breakpoint, GridPlacement, PageDocument, Section};

/// Give a section-less document one synthetic section and move every
/// element into it.
///
/// Documents that already have sections only get their element references
/// repaired: an element pointing at a missing section (or none) is assigned
/// to the first section. Running it twice yields the same document.
pub fn normalize(doc: &PageDocument, default_section_height: f64) -> PageDocument {
    let mut out = doc.clone();

    if out.sections.is_empty() {
        let section = Section {
            id: ids::section_id(),
            full_width: false,
            height: default_section_height,
            width: None,
            max_width: None,
        };
        debug!(page_id = %out.page_id, section_id = %section.id, "normalizing legacy document");
        for element in &mut out.elements {
            element.section_id = Some(section.id.clone());
        }
        out.sections.push(section);
        return out;
    }

    let first = out.sections[0].id.clone();
    let known: Vec<String> = out.sections.iter().map(|s| s.id.clone()).collect();
    for element in &mut out.elements {
        let dangling = match element.section_id.as_deref() {
            Some(id) => !known.iter().any(|k| k == id),
            None => true,
        };
        if dangling {
            element.section_id = Some(first.clone());
        }
    }
    out
}

/// Sum of section heights, or `default_height` when there are none
pub fn total_page_height(sections: &[Section], default_height: f64) -> f64 {
    if sections.is_empty() {
        return default_height;
    }
    sections.iter().map(|s| s.height).sum()
}

/// Append a section sized from the configured defaults
pub fn add_section(doc: &PageDocument, id: Option<String>, full_width: bool, config: &LayoutConfig) -> PageDocument {
    let mut out = doc.clone();
    out.sections.push(Section {
        id: id.unwrap_or_else(ids::section_id),
        full_width,
        height: config.default_section_height.max(config.min_section_height),
        width: (!full_width).then(|| config.initial_section_width()),
        max_width: None,
    });
    out
}

/// Remove a section. Its elements move to the first remaining section.
/// The last section of a page is never removed.
pub fn delete_section(doc: &PageDocument, section_id: &str) -> PageDocument {
    if doc.section(section_id).is_none() {
        debug!(section_id, "delete_section: unknown section");
        return doc.clone();
    }
    if doc.sections.len() == 1 {
        debug!(section_id, "delete_section: refusing to remove the last section");
        return doc.clone();
    }

    let mut out = doc.clone();
    out.sections.retain(|s| s.id != section_id);
    let fallback = out.sections.first().map(|s| s.id.clone());
    for element in &mut out.elements {
        if element.in_section(section_id) {
            element.section_id = fallback.clone();
        }
    }
    out
}

/// Resize a section's height (never below the configured minimum) and scale
/// the rows of every element inside it so the composition keeps its shape.
pub fn resize_section_height(doc: &PageDocument, section_id: &str, height: f64, config: &LayoutConfig) -> PageDocument {
    let Some(section) = doc.section(section_id) else {
        debug!(section_id, "resize_section_height: unknown section");
        return doc.clone();
    };

    let height = height.max(config.min_section_height);
    let old_rows = config.row_count(section.height);
    let new_rows = config.row_count(height);

    let mut out = doc.clone();
    for s in &mut out.sections {
        if s.id == section_id {
            s.height = height;
        }
    }

    if old_rows != new_rows {
        for element in out.elements.iter_mut().filter(|el| el.in_section(section_id)) {
            element.layout.map_stored(|p| rescale_rows(p, old_rows, new_rows));
        }
    }
    out
}

/// Scale a placement's rows from an `old_rows` grid to a `new_rows` grid
pub fn rescale_rows(placement: GridPlacement, old_rows: u32, new_rows: u32) -> GridPlacement {
    let old_rows = old_rows.max(1) as f64;
    let new_rows = new_rows.max(1);
    let ratio = new_rows as f64 / old_rows;

    let start = ((placement.row_start as f64 * ratio).round() as u32).min(new_rows - 1);
    let end = ((placement.row_end as f64 * ratio).round() as u32).clamp(start + 1, new_rows);

    GridPlacement {
        row_start: start,
        row_end: end,
        ..placement
    }
}

/// Switch between full-width and content-width. Going content-width keeps an
/// existing width or falls back to the desktop canvas width, capped at the
/// section's max width.
pub fn set_section_full_width(doc: &PageDocument, section_id: &str, full_width: bool, config: &LayoutConfig) -> PageDocument {
    if doc.section(section_id).is_none() {
        debug!(section_id, "set_section_full_width: unknown section");
        return doc.clone();
    }

    let mut out = doc.clone();
    for s in out.sections.iter_mut().filter(|s| s.id == section_id) {
        s.full_width = full_width;
        if !full_width && s.width.is_none() {
            let max = s.max_width.unwrap_or(config.max_section_width);
            s.width = Some(config.canvas_width(Breakpoint::Desktop).min(max));
        }
    }
    out
}

/// Set a content-width section's width, clamped to
/// `[min_section_width, max_width or max_section_width]`
pub fn resize_section_width(doc: &PageDocument, section_id: &str, width: f64, config: &LayoutConfig) -> PageDocument {
    if doc.section(section_id).is_none() {
        debug!(section_id, "resize_section_width: unknown section");
        return doc.clone();
    }

    let mut out = doc.clone();
    for s in out.sections.iter_mut().filter(|s| s.id == section_id) {
        let max = s.max_width.unwrap_or(config.max_section_width);
        let min = config.min_section_width.min(max);
        s.width = Some(width.clamp(min, max));
    }
    out
}
