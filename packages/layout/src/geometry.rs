//! # Coordinate & Grid Math
//!
//! Pure conversions between pixel rects, percent rects and grid cells.
//!
//! A grid with a fixed cell size rarely divides its container evenly, so the
//! centered variants split the leftover slack between both edges:
//!
//! ```text
//! container 1210px, step 50px → offset 5px
//! |5|  50  |  50  | ... |  50  |5|
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rect spanning two arbitrary corners (e.g. drag start and end)
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            w: (x1 - x0).abs(),
            h: (y1 - y0).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Rect in `[0, 100]` units relative to its container
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Cell range produced by a marquee: `min` inclusive, `max` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub min_col: u32,
    pub max_col: u32,
    pub min_row: u32,
    pub max_row: u32,
}

fn percent_of(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

pub fn to_percent_rect(rect: PixelRect, container_width: f64, container_height: f64) -> PercentRect {
    PercentRect {
        x: percent_of(rect.x, container_width),
        y: percent_of(rect.y, container_height),
        w: percent_of(rect.w, container_width),
        h: percent_of(rect.h, container_height),
    }
}

pub fn from_percent_rect(rect: PercentRect, container_width: f64, container_height: f64) -> PixelRect {
    PixelRect {
        x: rect.x / 100.0 * container_width,
        y: rect.y / 100.0 * container_height,
        w: rect.w / 100.0 * container_width,
        h: rect.h / 100.0 * container_height,
    }
}

/// Size of one grid cell as a percentage of the container
pub fn cell_percent(cell_size: f64, container: f64) -> f64 {
    percent_of(cell_size, container)
}

/// Nearest multiple of `step`. A non-positive step leaves the value alone.
pub fn snap(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Like [`snap`] but never smaller than one step
pub fn snap_size(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    snap(value, step).max(step)
}

pub fn centered_offset(container: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return 0.0;
    }
    container.rem_euclid(step) / 2.0
}

/// Snap on a grid whose leftover slack is split between both edges, then
/// keep the result inside `[offset, container - offset]`.
pub fn snap_centered(value: f64, step: f64, container: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let offset = centered_offset(container, step);
    let snapped = snap(value - offset, step) + offset;
    snapped.min(container - offset).max(offset)
}

/// Clamp a position so `[position, position + size]` stays in the container.
///
/// With a snap step the usable band shrinks by the centering offset.
pub fn clamp_position(position: f64, size: f64, container: f64, step: Option<f64>) -> f64 {
    let offset = step.map_or(0.0, |s| centered_offset(container, s));
    let max = (container - size - offset).max(offset);
    position.clamp(offset, max)
}

pub fn section_row_count(section_height: f64, row_height: f64) -> u32 {
    if row_height <= 0.0 || section_height <= 0.0 {
        return 1;
    }
    ((section_height / row_height).ceil() as u32).max(1)
}

fn cell_index(px: f64, cell: f64, round_up: bool, max: u32) -> u32 {
    if cell <= 0.0 {
        return 0;
    }
    let raw = px / cell;
    let index = if round_up { raw.ceil() } else { raw.floor() };
    index.clamp(0.0, max as f64) as u32
}

/// Convert a rubber-band box (px, relative to the section) into a cell range
pub fn marquee_to_grid_range(
    selection: PixelRect,
    container_width: f64,
    container_height: f64,
    grid_columns: u32,
    grid_row_height: f64,
) -> GridRange {
    let column_width = if grid_columns > 0 {
        container_width / grid_columns as f64
    } else {
        0.0
    };
    let rows = section_row_count(container_height, grid_row_height);

    GridRange {
        min_col: cell_index(selection.x, column_width, false, grid_columns),
        max_col: cell_index(selection.right(), column_width, true, grid_columns),
        min_row: cell_index(selection.y, grid_row_height, false, rows),
        max_row: cell_index(selection.bottom(), grid_row_height, true, rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridPlacement;

    const VALUES: [f64; 9] = [-37.5, -1.0, 0.0, 0.4, 12.5, 24.99, 25.0, 333.3, 1187.0];
    const STEPS: [f64; 5] = [1.0, 5.0, 8.0, 33.3, 50.0];

    #[test]
    fn test_snap_is_idempotent() {
        for &step in &STEPS {
            for &value in &VALUES {
                let once = snap(value, step);
                assert!((snap(once, step) - once).abs() < 1e-9, "value {value} step {step}");
            }
        }
    }

    #[test]
    fn test_snap_size_never_below_one_step() {
        for &step in &STEPS {
            for &value in VALUES.iter().filter(|v| **v >= 0.0) {
                assert!(snap_size(value, step) >= step);
            }
        }
        assert_eq!(snap_size(0.0, 50.0), 50.0);
        assert_eq!(snap_size(130.0, 50.0), 150.0);
    }

    #[test]
    fn test_snap_centered_stays_in_band() {
        for &container in &[1200.0, 1210.0, 768.0, 375.0] {
            for &step in &STEPS {
                let offset = centered_offset(container, step);
                for &value in &[-500.0, 0.0, 3.0, 599.0, container, container + 400.0] {
                    let snapped = snap_centered(value, step, container);
                    assert!(snapped >= offset - 1e-9);
                    assert!(snapped <= container - offset + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_centered_offset_splits_slack() {
        assert_eq!(centered_offset(1210.0, 50.0), 5.0);
        assert_eq!(centered_offset(1200.0, 50.0), 0.0);
        assert_eq!(snap_centered(27.0, 50.0, 1210.0), 5.0);
        assert_eq!(snap_centered(40.0, 50.0, 1210.0), 55.0);
    }

    #[test]
    fn test_zero_step_is_passthrough() {
        assert_eq!(snap(12.3, 0.0), 12.3);
        assert_eq!(snap_size(12.3, 0.0), 12.3);
        assert_eq!(snap_centered(12.3, 0.0, 100.0), 12.3);
    }

    #[test]
    fn test_percent_pixel_round_trip() {
        let rect = PixelRect::new(120.0, 45.0, 300.0, 90.0);
        for &(w, h) in &[(1200.0, 600.0), (768.0, 800.0), (375.0, 333.0)] {
            let back = from_percent_rect(to_percent_rect(rect, w, h), w, h);
            assert!((back.x - rect.x).abs() < 1e-9);
            assert!((back.y - rect.y).abs() < 1e-9);
            assert!((back.w - rect.w).abs() < 1e-9);
            assert!((back.h - rect.h).abs() < 1e-9);
        }
    }

    #[test]
    fn test_percent_of_empty_container_is_zero() {
        let rect = to_percent_rect(PixelRect::new(10.0, 10.0, 10.0, 10.0), 0.0, 0.0);
        assert_eq!(rect, PercentRect::default());
        assert_eq!(cell_percent(50.0, 0.0), 0.0);
        assert_eq!(cell_percent(50.0, 1000.0), 5.0);
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(-20.0, 10.0, 100.0, None), 0.0);
        assert_eq!(clamp_position(95.0, 10.0, 100.0, None), 90.0);
        // 110 % 50 = 10 → offset 5
        assert_eq!(clamp_position(0.0, 50.0, 110.0, Some(50.0)), 5.0);
        assert_eq!(clamp_position(90.0, 50.0, 110.0, Some(50.0)), 55.0);
    }

    #[test]
    fn test_marquee_range_selects_first_element_only() {
        // 10 columns of 10px, rows of 10px
        let range = marquee_to_grid_range(PixelRect::new(0.0, 0.0, 30.0, 30.0), 100.0, 100.0, 10, 10.0);
        assert_eq!(range, GridRange { min_col: 0, max_col: 3, min_row: 0, max_row: 3 });

        let first = GridPlacement::new(0, 2, 0, 2);
        let second = GridPlacement::new(5, 7, 5, 7);
        assert!(first.overlaps_range(&range));
        assert!(!second.overlaps_range(&range));
    }

    #[test]
    fn test_marquee_range_is_clamped_to_grid() {
        let rect = PixelRect::from_corners(150.0, 150.0, -20.0, -20.0);
        let range = marquee_to_grid_range(rect, 100.0, 100.0, 10, 10.0);
        assert_eq!(range, GridRange { min_col: 0, max_col: 10, min_row: 0, max_row: 10 });
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let placement = GridPlacement::new(3, 5, 0, 2);
        let range = GridRange { min_col: 0, max_col: 3, min_row: 0, max_row: 3 };
        assert!(!placement.overlaps_range(&range));
    }
}
