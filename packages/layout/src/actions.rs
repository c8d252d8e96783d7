//! # Element & Section Actions
//!
//! Document transforms, each `(&PageDocument, args) -> PageDocument`.
//!
//! [`Action`] names every transform so edits can be logged, replayed or sent
//! over the wire:
//!
//! ```text
//! Action::UpdateZIndex { id: "el-1", direction: Up }
//!   → z_index = max(all) + 1
//! ```
//!
//! Missing ids are no-ops. Placements are clamped into the element's section
//! grid before they are stored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::ids;
use crate::model::{Breakpoint, Content, Element, ElementLayout, GridPlacement, PageDocument};
use crate::placement::{self, LayoutUpdate};
use crate::sections;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZDirection {
    Up,
    Down,
}

/// Input for [`add_element`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewElement {
    #[serde(default = "ids::element_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl NewElement {
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            id: ids::element_id(),
            element_type: element_type.into(),
            content: Content::new(),
            section_id: None,
            external_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    pub fn in_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

/// Partial update of an element's non-layout fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap_to_grid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl ElementPatch {
    fn apply_to(&self, element: &mut Element) {
        if let Some(element_type) = &self.element_type {
            element.element_type = element_type.clone();
        }
        if let Some(content) = &self.content {
            element.content = content.clone();
        }
        if let Some(snap) = self.snap_to_grid {
            element.snap_to_grid = Some(snap);
        }
        if let Some(ratio) = self.aspect_ratio {
            element.aspect_ratio = Some(ratio);
        }
        if let Some(external_id) = &self.external_id {
            element.external_id = Some(external_id.clone());
        }
    }
}

/// Every edit the action layer knows how to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    AddElement(NewElement),
    UpdateElement {
        id: String,
        patch: ElementPatch,
    },
    UpdateContent {
        id: String,
        content: Content,
    },
    UpdateLayout {
        id: String,
        breakpoint: Breakpoint,
        placement: GridPlacement,
    },
    UpdateLayoutBulk {
        breakpoint: Breakpoint,
        updates: Vec<LayoutUpdate>,
    },
    UpdateZIndex {
        id: String,
        direction: ZDirection,
    },
    DeleteElement {
        id: String,
    },
    AddSection {
        id: Option<String>,
        full_width: bool,
    },
    DeleteSection {
        id: String,
    },
    UpdateSectionHeight {
        id: String,
        height: f64,
    },
    UpdateSectionWidth {
        id: String,
        width: f64,
    },
    UpdateSectionFullWidth {
        id: String,
        full_width: bool,
    },
}

impl Action {
    pub fn apply(&self, doc: &PageDocument, config: &LayoutConfig) -> PageDocument {
        match self {
            Action::AddElement(new) => add_element(doc, new, config),
            Action::UpdateElement { id, patch } => update_element(doc, id, patch),
            Action::UpdateContent { id, content } => update_element_content(doc, id, content.clone()),
            Action::UpdateLayout {
                id,
                breakpoint,
                placement,
            } => update_layout(doc, id, *breakpoint, *placement, config),
            Action::UpdateLayoutBulk { breakpoint, updates } => update_layout_bulk(doc, *breakpoint, updates, config),
            Action::UpdateZIndex { id, direction } => update_z_index(doc, id, *direction),
            Action::DeleteElement { id } => delete_element(doc, id),
            Action::AddSection { id, full_width } => sections::add_section(doc, id.clone(), *full_width, config),
            Action::DeleteSection { id } => sections::delete_section(doc, id),
            Action::UpdateSectionHeight { id, height } => sections::resize_section_height(doc, id, *height, config),
            Action::UpdateSectionWidth { id, width } => sections::resize_section_width(doc, id, *width, config),
            Action::UpdateSectionFullWidth { id, full_width } => {
                sections::set_section_full_width(doc, id, *full_width, config)
            }
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddElement(_) => "add_element",
            Action::UpdateElement { .. } => "update_element",
            Action::UpdateContent { .. } => "update_content",
            Action::UpdateLayout { .. } => "update_layout",
            Action::UpdateLayoutBulk { .. } => "update_layout_bulk",
            Action::UpdateZIndex { .. } => "update_z_index",
            Action::DeleteElement { .. } => "delete_element",
            Action::AddSection { .. } => "add_section",
            Action::DeleteSection { .. } => "delete_section",
            Action::UpdateSectionHeight { .. } => "update_section_height",
            Action::UpdateSectionWidth { .. } => "update_section_width",
            Action::UpdateSectionFullWidth { .. } => "update_section_full_width",
        }
    }
}

/// Add an element to the requested section (or the first one), first-fit
/// placed with the same cells on every breakpoint.
pub fn add_element(doc: &PageDocument, new: &NewElement, config: &LayoutConfig) -> PageDocument {
    let section = new
        .section_id
        .as_deref()
        .and_then(|id| doc.section(id))
        .or_else(|| doc.first_section());

    let placement = match section {
        Some(s) => placement::placement_for_new_element(Some(s), doc.elements_in_section(&s.id), config),
        None => placement::placement_for_new_element(None, doc.elements.iter(), config),
    };

    let element = Element {
        id: new.id.clone(),
        element_type: new.element_type.clone(),
        content: new.content.clone(),
        layout: ElementLayout::uniform(placement),
        z_index: doc.elements.len() as i64,
        section_id: section.map(|s| s.id.clone()),
        snap_to_grid: None,
        aspect_ratio: None,
        external_id: new.external_id.clone(),
    };

    let mut out = doc.clone();
    out.elements.push(element);
    out
}

fn with_element(doc: &PageDocument, id: &str, op: &str, f: impl FnOnce(&mut Element)) -> PageDocument {
    let mut out = doc.clone();
    match out.elements.iter_mut().find(|el| el.id == id) {
        Some(element) => f(element),
        None => debug!(id, op, "element not found"),
    }
    out
}

pub fn update_element(doc: &PageDocument, id: &str, patch: &ElementPatch) -> PageDocument {
    with_element(doc, id, "update_element", |el| patch.apply_to(el))
}

pub fn update_element_content(doc: &PageDocument, id: &str, content: Content) -> PageDocument {
    with_element(doc, id, "update_content", |el| el.content = content)
}

/// Grid bounds of the section an element lives in
fn grid_for(doc: &PageDocument, element: &Element, config: &LayoutConfig) -> (u32, u32) {
    let height = doc
        .section_of(element)
        .map_or(config.default_section_height, |s| s.height);
    (config.grid_columns, config.row_count(height))
}

/// Replace one breakpoint's placement, clamped to the element's section grid
pub fn update_layout(
    doc: &PageDocument,
    id: &str,
    breakpoint: Breakpoint,
    placement: GridPlacement,
    config: &LayoutConfig,
) -> PageDocument {
    let Some(element) = doc.element(id) else {
        debug!(id, "update_layout: element not found");
        return doc.clone();
    };
    let (columns, rows) = grid_for(doc, element, config);
    let placement = placement::clamp_placement(placement, columns, rows);

    with_element(doc, id, "update_layout", |el| el.layout.set(breakpoint, placement))
}

/// [`update_layout`] for a batch in one pass. Unknown ids are skipped.
pub fn update_layout_bulk(
    doc: &PageDocument,
    breakpoint: Breakpoint,
    updates: &[LayoutUpdate],
    config: &LayoutConfig,
) -> PageDocument {
    if updates.is_empty() {
        return doc.clone();
    }

    let clamped: Vec<(usize, GridPlacement)> = updates
        .iter()
        .filter_map(|update| {
            let index = doc.elements.iter().position(|el| el.id == update.id)?;
            let (columns, rows) = grid_for(doc, &doc.elements[index], config);
            Some((index, placement::clamp_placement(update.placement, columns, rows)))
        })
        .collect();

    let mut out = doc.clone();
    for (index, placement) in clamped {
        out.elements[index].layout.set(breakpoint, placement);
    }
    out
}

/// Bring to front (`max + 1`) or send to back (`min - 1`). Values are
/// never renumbered.
pub fn update_z_index(doc: &PageDocument, id: &str, direction: ZDirection) -> PageDocument {
    if doc.element(id).is_none() {
        debug!(id, "update_z_index: element not found");
        return doc.clone();
    }

    let z_values = doc.elements.iter().map(|el| el.z_index);
    let target = match direction {
        ZDirection::Up => z_values.max().unwrap_or(0) + 1,
        ZDirection::Down => z_values.min().unwrap_or(0) - 1,
    };
    with_element(doc, id, "update_z_index", |el| el.z_index = target)
}

pub fn delete_element(doc: &PageDocument, id: &str) -> PageDocument {
    let mut out = doc.clone();
    out.elements.retain(|el| el.id != id);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    fn page() -> PageDocument {
        let mut doc = PageDocument::new("home");
        doc.sections.push(Section {
            id: "s1".into(),
            full_width: false,
            height: 600.0,
            width: Some(1200.0),
            max_width: None,
        });
        doc
    }

    fn add(doc: &PageDocument, id: &str) -> PageDocument {
        add_element(doc, &NewElement::new("text").with_id(id), &LayoutConfig::default())
    }

    #[test]
    fn test_add_element_uses_first_fit() {
        let doc = add(&page(), "a");
        let doc = add(&doc, "b");

        let a = doc.element("a").unwrap();
        assert_eq!(a.layout.desktop, GridPlacement::new(0, 6, 0, 18));
        assert_eq!(a.layout, ElementLayout::uniform(a.layout.desktop));
        assert_eq!(a.section_id.as_deref(), Some("s1"));
        assert_eq!(a.z_index, 0);

        let b = doc.element("b").unwrap();
        assert_eq!(b.layout.desktop, GridPlacement::new(6, 12, 0, 18));
        assert_eq!(b.z_index, 1);
    }

    #[test]
    fn test_add_element_unknown_section_falls_back_to_first() {
        let new = NewElement::new("image").with_id("a").in_section("missing");
        let doc = add_element(&page(), &new, &LayoutConfig::default());
        assert_eq!(doc.element("a").and_then(|el| el.section_id.as_deref()), Some("s1"));
    }

    #[test]
    fn test_z_index_ordering() {
        let mut doc = page();
        for id in ["a", "b", "c"] {
            doc = add(&doc, id);
        }

        let down = update_z_index(&doc, "c", ZDirection::Down);
        let z = |d: &PageDocument, id: &str| d.element(id).map(|el| el.z_index).unwrap_or_default();
        assert!(z(&down, "c") < 0);
        assert!(z(&down, "c") < z(&down, "a") && z(&down, "c") < z(&down, "b"));

        let up = update_z_index(&doc, "a", ZDirection::Up);
        assert!(z(&up, "a") > 2);
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let doc = add(&page(), "a");
        let config = LayoutConfig::default();

        assert_eq!(update_z_index(&doc, "zz", ZDirection::Up), doc);
        assert_eq!(delete_element(&doc, "zz"), doc);
        assert_eq!(update_element_content(&doc, "zz", Content::new()), doc);
        assert_eq!(update_layout(&doc, "zz", Breakpoint::Tablet, GridPlacement::new(0, 1, 0, 1), &config), doc);
    }

    #[test]
    fn test_update_layout_touches_one_breakpoint() {
        let doc = add(&page(), "a");
        let config = LayoutConfig::default();

        let doc = update_layout(&doc, "a", Breakpoint::Mobile, GridPlacement::new(0, 24, 0, 10), &config);
        let el = doc.element("a").unwrap();
        assert_eq!(el.layout.mobile, Some(GridPlacement::new(0, 24, 0, 10)));
        assert_eq!(el.layout.desktop, GridPlacement::new(0, 6, 0, 18));
    }

    #[test]
    fn test_update_layout_is_clamped_to_section() {
        let doc = add(&page(), "a");
        let config = LayoutConfig::default();

        let doc = update_layout(&doc, "a", Breakpoint::Desktop, GridPlacement::new(20, 30, 70, 80), &config);
        assert_eq!(doc.element("a").map(|el| el.layout.desktop), Some(GridPlacement::new(14, 24, 65, 75)));
    }

    #[test]
    fn test_bulk_update_skips_unknown_ids() {
        let doc = add(&add(&page(), "a"), "b");
        let updates = vec![
            LayoutUpdate::new("a", GridPlacement::new(1, 2, 1, 2)),
            LayoutUpdate::new("ghost", GridPlacement::new(1, 2, 1, 2)),
            LayoutUpdate::new("b", GridPlacement::new(3, 4, 3, 4)),
        ];

        let doc = update_layout_bulk(&doc, Breakpoint::Tablet, &updates, &LayoutConfig::default());
        assert_eq!(doc.elements.len(), 2);
        assert_eq!(doc.element("a").and_then(|el| el.layout.tablet), Some(GridPlacement::new(1, 2, 1, 2)));
        assert_eq!(doc.element("b").and_then(|el| el.layout.tablet), Some(GridPlacement::new(3, 4, 3, 4)));
    }

    #[test]
    fn test_update_element_patch() {
        let doc = add(&page(), "a");
        let patch = ElementPatch {
            aspect_ratio: Some(1.5),
            external_id: Some("cms-42".into()),
            ..ElementPatch::default()
        };

        let doc = update_element(&doc, "a", &patch);
        let el = doc.element("a").unwrap();
        assert_eq!(el.aspect_ratio, Some(1.5));
        assert_eq!(el.external_id.as_deref(), Some("cms-42"));
        assert_eq!(el.element_type, "text");
    }

    #[test]
    fn test_action_serializes_and_applies() {
        let action = Action::UpdateZIndex {
            id: "a".into(),
            direction: ZDirection::Up,
        };
        let json = serde_json::to_string(&action).unwrap();
        let parsed: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
        assert_eq!(parsed.name(), "update_z_index");

        let doc = add(&page(), "a");
        let doc = parsed.apply(&doc, &LayoutConfig::default());
        assert_eq!(doc.element("a").map(|el| el.z_index), Some(1));
    }
}
