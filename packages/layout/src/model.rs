//! # Page Model
//!
//! Serializable shapes for a page: sections stacked vertically, elements
//! placed on a per-section grid, one placement per breakpoint.
//!
//! The persisted JSON uses camelCase keys and `type` for the element tag:
//!
//! ```json
//! {
//!   "pageId": "home",
//!   "sections": [{ "id": "sec-1", "fullWidth": false, "height": 600, "width": 1200 }],
//!   "elements": [{
//!     "id": "el-1", "type": "text", "content": { "text": "Hi" }, "zIndex": 0,
//!     "sectionId": "sec-1",
//!     "layout": { "desktop": { "columnStart": 0, "columnEnd": 6, "rowStart": 0, "rowEnd": 18 } }
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::geometry::{GridRange, PercentRect};

/// Opaque key-value bag handed to the component registry.
///
/// Ordered so structural equality does not depend on key insertion order.
pub type Content = BTreeMap<String, serde_json::Value>;

/// Named viewport-width bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown breakpoint: {0} (expected desktop, tablet or mobile)")]
pub struct ParseBreakpointError(String);

impl FromStr for Breakpoint {
    type Err = ParseBreakpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Breakpoint::Desktop),
            "tablet" => Ok(Breakpoint::Tablet),
            "mobile" => Ok(Breakpoint::Mobile),
            other => Err(ParseBreakpointError(other.to_string())),
        }
    }
}

/// Canvas width in px for each breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    pub desktop: f64,
    pub tablet: f64,
    pub mobile: f64,
}

impl Breakpoints {
    pub fn width(&self, breakpoint: Breakpoint) -> f64 {
        match breakpoint {
            Breakpoint::Desktop => self.desktop,
            Breakpoint::Tablet => self.tablet,
            Breakpoint::Mobile => self.mobile,
        }
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            desktop: 1200.0,
            tablet: 768.0,
            mobile: 375.0,
        }
    }
}

/// Cell-based placement, zero-based and end-exclusive on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPlacement {
    pub column_start: u32,
    pub column_end: u32,
    pub row_start: u32,
    pub row_end: u32,
}

impl GridPlacement {
    pub fn new(column_start: u32, column_end: u32, row_start: u32, row_end: u32) -> Self {
        Self {
            column_start,
            column_end,
            row_start,
            row_end,
        }
    }

    pub fn from_origin(column: u32, row: u32, column_span: u32, row_span: u32) -> Self {
        Self {
            column_start: column,
            column_end: column + column_span,
            row_start: row,
            row_end: row + row_span,
        }
    }

    pub fn column_span(&self) -> u32 {
        self.column_end.saturating_sub(self.column_start)
    }

    pub fn row_span(&self) -> u32 {
        self.row_end.saturating_sub(self.row_start)
    }

    /// `0 <= start < end <= bound` on both axes
    pub fn is_within(&self, columns: u32, rows: u32) -> bool {
        self.column_start < self.column_end
            && self.column_end <= columns
            && self.row_start < self.row_end
            && self.row_end <= rows
    }

    pub fn overlaps(&self, other: &GridPlacement) -> bool {
        self.column_end > other.column_start
            && self.column_start < other.column_end
            && self.row_end > other.row_start
            && self.row_start < other.row_end
    }

    /// Half-open overlap test against a marquee range
    pub fn overlaps_range(&self, range: &GridRange) -> bool {
        self.column_end > range.min_col
            && self.column_start < range.max_col
            && self.row_end > range.min_row
            && self.row_start < range.max_row
    }

    /// Percent projection relative to a `columns x rows` grid
    pub fn to_percent(&self, columns: u32, rows: u32) -> PercentRect {
        let col = 100.0 / columns.max(1) as f64;
        let row = 100.0 / rows.max(1) as f64;
        PercentRect {
            x: self.column_start as f64 * col,
            y: self.row_start as f64 * row,
            w: self.column_span() as f64 * col,
            h: self.row_span() as f64 * row,
        }
    }

    /// Nearest placement for a percent rect, clamped into the grid
    pub fn from_percent(rect: PercentRect, columns: u32, rows: u32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let col_span = ((rect.w / 100.0 * columns as f64).round() as i64).clamp(1, columns as i64);
        let row_span = ((rect.h / 100.0 * rows as f64).round() as i64).clamp(1, rows as i64);
        let col = ((rect.x / 100.0 * columns as f64).round() as i64).clamp(0, columns as i64 - col_span);
        let row = ((rect.y / 100.0 * rows as f64).round() as i64).clamp(0, rows as i64 - row_span);
        Self::from_origin(col as u32, row as u32, col_span as u32, row_span as u32)
    }
}

/// One placement per breakpoint. Tablet and mobile fall back to desktop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementLayout {
    pub desktop: GridPlacement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<GridPlacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<GridPlacement>,
}

impl ElementLayout {
    /// Same placement stored for every breakpoint
    pub fn uniform(placement: GridPlacement) -> Self {
        Self {
            desktop: placement,
            tablet: Some(placement),
            mobile: Some(placement),
        }
    }

    pub fn stored(&self, breakpoint: Breakpoint) -> Option<GridPlacement> {
        match breakpoint {
            Breakpoint::Desktop => Some(self.desktop),
            Breakpoint::Tablet => self.tablet,
            Breakpoint::Mobile => self.mobile,
        }
    }

    /// Stored placement for the breakpoint, else desktop
    pub fn resolve(&self, breakpoint: Breakpoint) -> GridPlacement {
        self.stored(breakpoint).unwrap_or(self.desktop)
    }

    pub fn set(&mut self, breakpoint: Breakpoint, placement: GridPlacement) {
        match breakpoint {
            Breakpoint::Desktop => self.desktop = placement,
            Breakpoint::Tablet => self.tablet = Some(placement),
            Breakpoint::Mobile => self.mobile = Some(placement),
        }
    }

    /// Apply `f` to every stored placement
    pub fn map_stored(&mut self, mut f: impl FnMut(GridPlacement) -> GridPlacement) {
        self.desktop = f(self.desktop);
        self.tablet = self.tablet.map(&mut f);
        self.mobile = self.mobile.map(&mut f);
    }
}

/// A content block placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,

    /// Registry tag, opaque to layout
    #[serde(rename = "type")]
    pub element_type: String,

    #[serde(default)]
    pub content: Content,

    pub layout: ElementLayout,

    #[serde(default)]
    pub z_index: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_to_grid: Option<bool>,

    /// Width / height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,

    /// Caller-owned link to an external model (CMS entry, analytics id, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl Element {
    pub fn snaps_to_grid(&self) -> bool {
        self.snap_to_grid.unwrap_or(true)
    }

    pub fn in_section(&self, section_id: &str) -> bool {
        self.section_id.as_deref() == Some(section_id)
    }
}

/// A vertically stacked region of the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub full_width: bool,
    /// px
    pub height: f64,
    /// px, only meaningful when not full width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
}

/// The persisted unit handed to and from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub page_id: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl PageDocument {
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            elements: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// No sections yet; must be normalized before placement runs
    pub fn is_legacy(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    pub fn elements_in_section<'a>(&'a self, section_id: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |el| el.in_section(section_id))
    }

    /// Section an element belongs to, if it still exists
    pub fn section_of(&self, element: &Element) -> Option<&Section> {
        element.section_id.as_deref().and_then(|id| self.section(id))
    }
}
