//! # Placement Engine
//!
//! Produces and validates grid placements. Every placement leaving this
//! module satisfies `0 <= start < end <= bound` on both axes for the grid it
//! was computed against.
//!
//! Pointer-level geometry (drag deltas and resize rects in px) is turned into
//! cells through [`GridGeometry`]; the result is what gets committed.

use crate::config::LayoutConfig;
use crate::geometry::{self, PixelRect};
use crate::model::{Breakpoint, Element, GridPlacement, Section};

/// Placement of one element in a batch update
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutUpdate {
    pub id: String,
    pub placement: GridPlacement,
}

impl LayoutUpdate {
    pub fn new(id: impl Into<String>, placement: GridPlacement) -> Self {
        Self {
            id: id.into(),
            placement,
        }
    }
}

/// Placement for a breakpoint, falling back to desktop.
///
/// No rescaling happens: a desktop placement reused on a narrower breakpoint
/// keeps its cell coordinates.
pub fn ensure_breakpoint_layout(element: &Element, breakpoint: Breakpoint) -> GridPlacement {
    element.layout.resolve(breakpoint)
}

/// First-fit slot for a new `col_span x row_span` element.
///
/// Scans row-major from the top-left and returns the first origin whose span
/// fits the grid without touching an existing placement. When every origin
/// collides the top-left origin is returned; stacking is permitted.
pub fn find_next_placement(
    grid_columns: u32,
    row_count: u32,
    col_span: u32,
    row_span: u32,
    existing: &[GridPlacement],
) -> GridPlacement {
    let columns = grid_columns.max(1);
    let rows = row_count.max(1);
    let col_span = col_span.clamp(1, columns);
    let row_span = row_span.clamp(1, rows);

    for row in 0..=(rows - row_span) {
        for column in 0..=(columns - col_span) {
            let candidate = GridPlacement::from_origin(column, row, col_span, row_span);
            if !existing.iter().any(|p| p.overlaps(&candidate)) {
                return candidate;
            }
        }
    }

    GridPlacement::from_origin(0, 0, col_span, row_span)
}

/// Clamp a placement into a `columns x rows` grid, keeping its span when it fits
pub fn clamp_placement(placement: GridPlacement, columns: u32, rows: u32) -> GridPlacement {
    place_clamped(
        placement.column_start as i64,
        placement.row_start as i64,
        placement.column_span() as i64,
        placement.row_span() as i64,
        columns,
        rows,
    )
}

fn place_clamped(column: i64, row: i64, col_span: i64, row_span: i64, columns: u32, rows: u32) -> GridPlacement {
    let columns = columns.max(1) as i64;
    let rows = rows.max(1) as i64;
    let col_span = col_span.clamp(1, columns);
    let row_span = row_span.clamp(1, rows);
    let column = column.clamp(0, columns - col_span);
    let row = row.clamp(0, rows - row_span);
    GridPlacement::from_origin(column as u32, row as u32, col_span as u32, row_span as u32)
}

/// Default span for a freshly added element: a quarter of the grid, capped
fn default_span(columns: u32, rows: u32) -> (u32, u32) {
    ((columns / 4).clamp(1, 6), (rows / 4).clamp(1, 20))
}

/// Suggested placement for a new element in a section
pub fn placement_for_new_element<'a>(
    section: Option<&Section>,
    siblings: impl IntoIterator<Item = &'a Element>,
    config: &LayoutConfig,
) -> GridPlacement {
    let height = section.map_or(config.default_section_height, |s| s.height);
    let rows = config.row_count(height);
    let (col_span, row_span) = default_span(config.grid_columns, rows);
    let existing: Vec<GridPlacement> = siblings
        .into_iter()
        .map(|el| ensure_breakpoint_layout(el, Breakpoint::Desktop))
        .collect();

    find_next_placement(config.grid_columns, rows, col_span, row_span, &existing)
}

/// Pixel geometry of one section's grid at one breakpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub columns: u32,
    /// px
    pub row_height: f64,
    /// px
    pub width: f64,
    /// px
    pub height: f64,
}

impl GridGeometry {
    pub fn new(columns: u32, row_height: f64, width: f64, height: f64) -> Self {
        Self {
            columns,
            row_height,
            width,
            height,
        }
    }

    /// Geometry of `section` rendered at `breakpoint`
    pub fn for_section(section: Option<&Section>, breakpoint: Breakpoint, config: &LayoutConfig) -> Self {
        let canvas = config.canvas_width(breakpoint);
        let width = match section {
            Some(s) if !s.full_width => {
                let max = s.max_width.unwrap_or(config.max_section_width);
                s.width.unwrap_or(canvas).min(max).min(canvas)
            }
            _ => canvas,
        };
        let height = section.map_or(config.default_section_height, |s| s.height);
        Self::new(config.grid_columns, config.grid_row_height, width, height)
    }

    pub fn row_count(&self) -> u32 {
        geometry::section_row_count(self.height, self.row_height)
    }

    pub fn column_width(&self) -> f64 {
        if self.columns == 0 {
            0.0
        } else {
            self.width / self.columns as f64
        }
    }

    pub fn clamp(&self, placement: GridPlacement) -> GridPlacement {
        clamp_placement(placement, self.columns, self.row_count())
    }

    pub fn to_pixels(&self, placement: GridPlacement) -> PixelRect {
        let cw = self.column_width();
        PixelRect {
            x: placement.column_start as f64 * cw,
            y: placement.row_start as f64 * self.row_height,
            w: placement.column_span() as f64 * cw,
            h: placement.row_span() as f64 * self.row_height,
        }
    }

    /// Cells covered by a pixel rect. Snapping rounds to the nearest line;
    /// without it the rect grows to the cells it touches.
    pub fn placement_from_pixels(&self, rect: PixelRect, snap: bool) -> GridPlacement {
        let (column, col_span) = axis_cells(rect.x, rect.w, self.column_width(), snap);
        let (row, row_span) = axis_cells(rect.y, rect.h, self.row_height, snap);
        place_clamped(column, row, col_span, row_span, self.columns, self.row_count())
    }

    /// Raw pointer delta in px to a whole-cell delta
    pub fn delta_to_cells(&self, dx: f64, dy: f64) -> (i64, i64) {
        let cw = self.column_width();
        let columns = if cw > 0.0 { (geometry::snap(dx, cw) / cw).round() as i64 } else { 0 };
        let rows = if self.row_height > 0.0 {
            (geometry::snap(dy, self.row_height) / self.row_height).round() as i64
        } else {
            0
        };
        (columns, rows)
    }

    /// Shift by whole cells, clamped so the span stays inside the grid
    pub fn translate(&self, placement: GridPlacement, d_col: i64, d_row: i64) -> GridPlacement {
        place_clamped(
            placement.column_start as i64 + d_col,
            placement.row_start as i64 + d_row,
            placement.column_span() as i64,
            placement.row_span() as i64,
            self.columns,
            self.row_count(),
        )
    }

    pub fn commit_move(&self, placement: GridPlacement, dx: f64, dy: f64) -> GridPlacement {
        let (d_col, d_row) = self.delta_to_cells(dx, dy);
        self.translate(placement, d_col, d_row)
    }

    /// Resize to a pixel rect, deriving height from width when the element
    /// has an aspect ratio, then clamp.
    pub fn commit_resize(&self, rect: PixelRect, snap: bool, aspect_ratio: Option<f64>) -> GridPlacement {
        let placement = self.placement_from_pixels(rect, snap);
        match aspect_ratio {
            Some(ratio) => self.apply_aspect_ratio(placement, ratio),
            None => placement,
        }
    }

    pub fn apply_aspect_ratio(&self, placement: GridPlacement, ratio: f64) -> GridPlacement {
        if ratio <= 0.0 || self.row_height <= 0.0 {
            return self.clamp(placement);
        }
        let width_px = placement.column_span() as f64 * self.column_width();
        let row_span = (width_px / ratio / self.row_height).round() as i64;
        place_clamped(
            placement.column_start as i64,
            placement.row_start as i64,
            placement.column_span() as i64,
            row_span,
            self.columns,
            self.row_count(),
        )
    }
}

fn axis_cells(start: f64, size: f64, cell: f64, snap: bool) -> (i64, i64) {
    if cell <= 0.0 {
        return (0, 1);
    }
    if snap {
        let origin = (geometry::snap(start, cell) / cell).round() as i64;
        let span = (geometry::snap_size(size, cell) / cell).round() as i64;
        (origin, span)
    } else {
        let origin = (start / cell).floor() as i64;
        let end = ((start + size) / cell).ceil() as i64;
        (origin, (end - origin).max(1))
    }
}

/// Commit a group drag.
///
/// The primary element's proposed placement is clamped first; the delta it
/// actually moved by is then applied to every other member, each clamped on
/// its own. Relative spacing survives when the primary hits an edge.
pub fn move_group<'a>(
    geometry: &GridGeometry,
    primary_id: &str,
    primary_before: GridPlacement,
    primary_proposed: GridPlacement,
    others: impl IntoIterator<Item = (&'a str, GridPlacement)>,
) -> Vec<LayoutUpdate> {
    let primary = geometry.clamp(primary_proposed);
    let d_col = primary.column_start as i64 - primary_before.column_start as i64;
    let d_row = primary.row_start as i64 - primary_before.row_start as i64;

    let mut updates = vec![LayoutUpdate::new(primary_id, primary)];
    for (id, placement) in others {
        if id == primary_id {
            continue;
        }
        updates.push(LayoutUpdate::new(id, geometry.translate(placement, d_col, d_row)));
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GridGeometry {
        // 20 columns of 50px (5%), 20 rows of 10px
        GridGeometry::new(20, 10.0, 1000.0, 200.0)
    }

    #[test]
    fn test_first_fit_on_empty_grid() {
        let placement = find_next_placement(24, 75, 6, 18, &[]);
        assert_eq!(placement, GridPlacement::new(0, 6, 0, 18));
    }

    #[test]
    fn test_first_fit_skips_taken_cells_row_major() {
        let existing = [GridPlacement::new(0, 6, 0, 18)];
        let placement = find_next_placement(24, 75, 6, 18, &existing);
        assert_eq!(placement, GridPlacement::new(6, 12, 0, 18));

        let full_row = [GridPlacement::new(0, 24, 0, 18)];
        let placement = find_next_placement(24, 75, 6, 18, &full_row);
        assert_eq!(placement, GridPlacement::new(0, 6, 18, 36));
    }

    #[test]
    fn test_first_fit_is_deterministic() {
        let existing = [GridPlacement::new(0, 3, 0, 3), GridPlacement::new(4, 9, 1, 2)];
        let a = find_next_placement(10, 10, 3, 3, &existing);
        let b = find_next_placement(10, 10, 3, 3, &existing);
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_grid_falls_back_to_origin() {
        let existing = [GridPlacement::new(0, 4, 0, 4)];
        let placement = find_next_placement(4, 4, 2, 2, &existing);
        assert_eq!(placement, GridPlacement::new(0, 2, 0, 2));
    }

    #[test]
    fn test_oversized_span_is_clamped() {
        let placement = find_next_placement(4, 4, 10, 0, &[]);
        assert_eq!(placement, GridPlacement::new(0, 4, 0, 1));
    }

    #[test]
    fn test_clamp_repairs_invalid_placements() {
        // zero span
        assert_eq!(clamp_placement(GridPlacement::new(3, 3, 2, 2), 10, 10), GridPlacement::new(3, 4, 2, 3));
        // past the right edge
        assert_eq!(clamp_placement(GridPlacement::new(8, 12, 0, 2), 10, 10), GridPlacement::new(6, 10, 0, 2));
        // inverted
        assert!(clamp_placement(GridPlacement::new(5, 2, 9, 1), 10, 10).is_within(10, 10));
    }

    #[test]
    fn test_pointer_delta_to_cells() {
        let geo = geometry();
        assert_eq!(geo.delta_to_cells(50.0, 0.0), (1, 0));
        assert_eq!(geo.delta_to_cells(70.0, -14.0), (1, -1));
        assert_eq!(geo.delta_to_cells(20.0, 4.0), (0, 0));
    }

    #[test]
    fn test_move_is_clamped_to_bounds() {
        let geo = geometry();
        let placement = GridPlacement::new(18, 20, 0, 2);
        assert_eq!(geo.commit_move(placement, 150.0, -30.0), placement);
        assert_eq!(geo.commit_move(placement, -100.0, 20.0), GridPlacement::new(16, 18, 2, 4));
    }

    #[test]
    fn test_placement_from_pixels() {
        let geo = geometry();
        let rect = PixelRect::new(60.0, 12.0, 90.0, 4.0);
        assert_eq!(geo.placement_from_pixels(rect, true), GridPlacement::new(1, 3, 1, 2));
        assert_eq!(geo.placement_from_pixels(rect, false), GridPlacement::new(1, 3, 1, 2));

        let tiny = PixelRect::new(101.0, 0.0, 1.0, 1.0);
        assert_eq!(geo.placement_from_pixels(tiny, true), GridPlacement::new(2, 3, 0, 1));
        assert_eq!(geo.to_pixels(GridPlacement::new(2, 3, 0, 1)), PixelRect::new(100.0, 0.0, 50.0, 10.0));
    }

    #[test]
    fn test_aspect_ratio_derives_rows() {
        let geo = geometry();
        // 4 columns = 200px wide, ratio 2 → 100px → 10 rows
        let resized = geo.commit_resize(PixelRect::new(0.0, 0.0, 200.0, 30.0), true, Some(2.0));
        assert_eq!(resized, GridPlacement::new(0, 4, 0, 10));
        // a square wider than the grid is tall gets clamped
        let square = geo.commit_resize(PixelRect::new(0.0, 0.0, 500.0, 10.0), true, Some(1.0));
        assert_eq!(square.row_span(), 20);
    }

    #[test]
    fn test_group_move_broadcasts_primary_delta() {
        let geo = geometry();
        // x:10 w:10 and x:30 w:10 (percent) on 5% columns
        let first = GridPlacement::new(2, 4, 2, 4);
        let second = GridPlacement::new(6, 8, 2, 4);
        let proposed = geo.commit_move(first, 50.0, 0.0);

        let updates = move_group(&geo, "a", first, proposed, [("a", first), ("b", second)]);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].placement.to_percent(20, 20).x, 15.0);
        assert_eq!(updates[1].placement.to_percent(20, 20).x, 35.0);
        assert_eq!(updates[1].placement.row_start, 2);
    }

    #[test]
    fn test_group_move_uses_clamped_delta() {
        let geo = geometry();
        let primary = GridPlacement::new(17, 19, 0, 2);
        let other = GridPlacement::new(10, 12, 5, 7);
        let proposed = GridPlacement::new(20, 22, 0, 2);

        let updates = move_group(&geo, "a", primary, proposed, [("b", other)]);
        assert_eq!(updates[0].placement, GridPlacement::new(18, 20, 0, 2));
        assert_eq!(updates[1].placement, GridPlacement::new(11, 13, 5, 7));
    }

    #[test]
    fn test_section_geometry_width() {
        let config = LayoutConfig::default();
        let section = Section {
            id: "s".into(),
            full_width: false,
            height: 400.0,
            width: Some(1000.0),
            max_width: Some(900.0),
        };
        let geo = GridGeometry::for_section(Some(&section), Breakpoint::Desktop, &config);
        assert_eq!(geo.width, 900.0);
        assert_eq!(geo.row_count(), 50);

        let mobile = GridGeometry::for_section(Some(&section), Breakpoint::Mobile, &config);
        assert_eq!(mobile.width, 375.0);
    }
}
