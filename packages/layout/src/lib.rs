//! # Vantage Layout
//!
//! Grid placement engine for Vantage pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ pointer: raw px deltas / rects              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ layout: PageDocument transforms             │
//! │  - px ⇄ percent ⇄ grid cell conversions     │
//! │  - first-fit placement, clamping, snapping  │
//! │  - sections, actions, selection, CSS        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: history, dirty tracking, saving     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Grid cells are canonical**: every breakpoint stores
//!    `{columnStart, columnEnd, rowStart, rowEnd}`, zero-based, end-exclusive
//! 2. **Values in, values out**: transforms never mutate their input
//! 3. **Never fail on bad input**: unknown ids are no-ops, geometry is clamped
//! 4. **Legacy at the edge**: percent-rect documents are converted once, in
//!    [`compat`], and nowhere else
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vantage_layout::{normalize, Action, LayoutConfig, NewElement, PageDocument};
//!
//! let config = LayoutConfig::default();
//! let doc = normalize(&PageDocument::new("home"), config.default_section_height);
//!
//! let doc = Action::AddElement(NewElement::new("text")).apply(&doc, &config);
//! assert_eq!(doc.elements.len(), 1);
//! ```

pub mod actions;
pub mod compat;
mod config;
pub mod css;
pub mod geometry;
pub mod ids;
mod model;
pub mod placement;
pub mod sections;
pub mod selection;

pub use actions::{Action, ElementPatch, NewElement, ZDirection};
pub use compat::{decode_document, CompatError};
pub use config::LayoutConfig;
pub use css::{live_stylesheet, CssPlacement};
pub use geometry::{GridRange, PercentRect, PixelRect};
pub use model::{
    Breakpoint, Breakpoints, Content, Element, ElementLayout, GridPlacement, PageDocument, ParseBreakpointError,
    Section,
};
pub use placement::{find_next_placement, GridGeometry, LayoutUpdate};
pub use sections::{normalize, total_page_height};
pub use selection::{marquee_select, Selection};
