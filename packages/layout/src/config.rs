//! Grid and canvas settings read by the layout engine.

use serde::{Deserialize, Serialize};

use crate::geometry::section_row_count;
use crate::model::{Breakpoint, Breakpoints};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub grid_columns: u32,

    /// px
    pub grid_row_height: f64,

    pub breakpoints: Breakpoints,

    /// Page height used before any section exists
    pub default_canvas_height: f64,

    pub default_section_height: f64,

    pub min_section_height: f64,

    pub min_section_width: f64,

    /// Cap for content-width sections when the section sets no `maxWidth`
    pub max_section_width: f64,
}

impl LayoutConfig {
    pub fn canvas_width(&self, breakpoint: Breakpoint) -> f64 {
        self.breakpoints.width(breakpoint)
    }

    pub fn row_count(&self, section_height: f64) -> u32 {
        section_row_count(section_height, self.grid_row_height)
    }

    /// Width a new content-width section starts with
    pub fn initial_section_width(&self) -> f64 {
        self.canvas_width(Breakpoint::Desktop).min(self.max_section_width)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_columns: 24,
            grid_row_height: 8.0,
            breakpoints: Breakpoints::default(),
            default_canvas_height: 800.0,
            default_section_height: 600.0,
            min_section_height: 100.0,
            min_section_width: 320.0,
            max_section_width: 1200.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{ "gridColumns": 12 }"#).unwrap();
        assert_eq!(config.grid_columns, 12);
        assert_eq!(config.grid_row_height, 8.0);
        assert_eq!(config.breakpoints.tablet, 768.0);
    }

    #[test]
    fn test_row_count_rounds_up() {
        let config = LayoutConfig::default();
        assert_eq!(config.row_count(600.0), 75);
        assert_eq!(config.row_count(601.0), 76);
    }
}
