//! Selection set and marquee hit testing.

use std::collections::BTreeSet;

use crate::geometry::{self, GridRange, PixelRect};
use crate::model::{Breakpoint, PageDocument};
use crate::placement::GridGeometry;

/// Selected element ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
    }

    /// Add or remove one id (modifier click)
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Plain click: an already selected element keeps the multi-selection
    /// so the group can be dragged, anything else becomes the only selection.
    pub fn click(&mut self, id: &str) {
        if !self.ids.contains(id) {
            self.select([id]);
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist in `doc`. Returns true if anything was removed.
    pub fn retain_existing(&mut self, doc: &PageDocument) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| doc.element(id).is_some());
        self.ids.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

/// Ids of the elements in `section_id` whose placement at `breakpoint`
/// intersects `range`. Elements of other sections are never returned.
pub fn marquee_select(doc: &PageDocument, section_id: &str, breakpoint: Breakpoint, range: &GridRange) -> Vec<String> {
    doc.elements_in_section(section_id)
        .filter(|el| el.layout.resolve(breakpoint).overlaps_range(range))
        .map(|el| el.id.clone())
        .collect()
}

/// [`marquee_select`] for a rubber-band box in px, relative to the section
pub fn marquee_select_px(
    doc: &PageDocument,
    section_id: &str,
    breakpoint: Breakpoint,
    grid: &GridGeometry,
    selection: PixelRect,
) -> Vec<String> {
    let range = geometry::marquee_to_grid_range(selection, grid.width, grid.height, grid.columns, grid.row_height);
    marquee_select(doc, section_id, breakpoint, &range)
}
