//! # Legacy Document Adapter
//!
//! Older pages store each breakpoint as a percent rect relative to its
//! section, plus a cached `responsive` copy of the desktop rect:
//!
//! ```json
//! "layout": {
//!   "desktop": { "x": 10, "y": 10, "w": 25, "h": 30 },
//!   "tablet":  { "x": 10, "y": 10, "w": 25, "h": 30 },
//!   "responsive": { "left": 10, "top": 10, "width": 25, "height": 30 }
//! }
//! ```
//!
//! [`decode_document`] accepts both that shape and the current grid-cell
//! shape. Percent rects are converted to the nearest cells of the element's
//! section grid and the `responsive` cache is dropped.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::geometry::PercentRect;
use crate::model::{Breakpoint, GridPlacement, PageDocument};

#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Page document is not a JSON object")]
    NotAnObject,

    #[error("Malformed page document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// True if any element still carries a percent-rect layout
pub fn needs_migration(value: &Value) -> bool {
    elements(value).any(|el| {
        el.get("layout")
            .and_then(Value::as_object)
            .is_some_and(|layout| layout.contains_key("responsive") || layout.values().any(is_percent_rect))
    })
}

fn elements(value: &Value) -> impl Iterator<Item = &Value> {
    value
        .get("elements")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn is_percent_rect(value: &Value) -> bool {
    value.as_object().is_some_and(|o| o.contains_key("x") && o.contains_key("w"))
}

fn percent_rect(value: &Value) -> PercentRect {
    let field = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    PercentRect {
        x: field("x"),
        y: field("y"),
        w: field("w"),
        h: field("h"),
    }
}

/// Height of each section by id, read before typed decoding
fn section_heights(value: &Value) -> Vec<(String, f64)> {
    value
        .get("sections")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|s| {
            let id = s.get("id")?.as_str()?.to_string();
            let height = s.get("height")?.as_f64()?;
            Some((id, height))
        })
        .collect()
}

fn migrate_layout(layout: &mut Map<String, Value>, rows: u32, columns: u32) -> Result<(), CompatError> {
    layout.remove("responsive");
    for bp in Breakpoint::ALL {
        let Some(slot) = layout.get_mut(bp.as_str()) else {
            continue;
        };
        if is_percent_rect(slot) {
            let placement = GridPlacement::from_percent(percent_rect(slot), columns, rows);
            *slot = serde_json::to_value(placement)?;
        }
    }
    Ok(())
}

/// Decode a stored page, converting percent-rect layouts to grid cells
pub fn decode_document(mut value: Value, config: &LayoutConfig) -> Result<PageDocument, CompatError> {
    if !value.is_object() {
        return Err(CompatError::NotAnObject);
    }

    let heights = section_heights(&value);
    if let Some(elements) = value.get_mut("elements").and_then(Value::as_array_mut) {
        for element in elements {
            let height = element
                .get("sectionId")
                .and_then(Value::as_str)
                .and_then(|id| heights.iter().find(|(s, _)| s == id))
                .map_or(config.default_section_height, |(_, h)| *h);
            let rows = config.row_count(height);

            if let Some(layout) = element.get_mut("layout").and_then(Value::as_object_mut) {
                migrate_layout(layout, rows, config.grid_columns)?;
            }
        }
    }

    Ok(serde_json::from_value(value)?)
}
