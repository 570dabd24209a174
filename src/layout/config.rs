//! Configuration for a layout pass

use serde::Deserialize;

use super::error::{require_finite, require_non_negative, require_positive, LayoutError};
use super::types::Point;

/// Configuration options for box layout
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the focused root box in model space
    pub root_width: f64,

    /// Top-left corner of the root box in model space
    pub origin: Point,

    /// Gap between sibling boxes and around them inside the child zone
    pub child_spacing: f64,

    /// Children narrower than this are not laid out
    pub min_box_width: f64,

    /// Maximum nesting depth below the root (unlimited when `None`)
    pub max_depth: Option<usize>,

    /// Whether boxes render their extended info panel
    pub show_expanded_info: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            root_width: 800.0,
            origin: Point::new(0.0, 0.0),
            child_spacing: 4.0,
            min_box_width: 8.0,
            max_depth: None,
            show_expanded_info: false,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root box width
    pub fn with_root_width(mut self, width: f64) -> Self {
        self.root_width = width;
        self
    }

    /// Set the root box origin
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = Point::new(x, y);
        self
    }

    /// Set the spacing between sibling boxes
    pub fn with_child_spacing(mut self, spacing: f64) -> Self {
        self.child_spacing = spacing;
        self
    }

    /// Set the minimum width a child box must have to be laid out
    pub fn with_min_box_width(mut self, width: f64) -> Self {
        self.min_box_width = width;
        self
    }

    /// Limit the nesting depth below the root
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Enable or disable the extended info panel
    pub fn with_expanded_info(mut self, show: bool) -> Self {
        self.show_expanded_info = show;
        self
    }

    /// Check that every geometric setting can describe a layout
    pub fn validate(&self) -> Result<(), LayoutError> {
        require_positive("root width", self.root_width)?;
        require_finite("origin x", self.origin.x)?;
        require_finite("origin y", self.origin.y)?;
        require_non_negative("child spacing", self.child_spacing)?;
        require_finite("min box width", self.min_box_width)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.root_width, 800.0);
        assert_eq!(config.origin, Point::new(0.0, 0.0));
        assert_eq!(config.child_spacing, 4.0);
        assert_eq!(config.min_box_width, 8.0);
        assert_eq!(config.max_depth, None);
        assert!(!config.show_expanded_info);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_root_width(100.0)
            .with_child_spacing(0.0)
            .with_max_depth(2);

        assert_eq!(config.root_width, 100.0);
        assert_eq!(config.child_spacing, 0.0);
        assert_eq!(config.max_depth, Some(2));
    }

    #[test]
    fn test_validate() {
        assert!(LayoutConfig::default().validate().is_ok());
        assert!(LayoutConfig::new().with_min_box_width(-1.0).validate().is_ok());

        let cases = [
            (LayoutConfig::new().with_root_width(0.0), "root width"),
            (LayoutConfig::new().with_origin(f64::NAN, 0.0), "origin x"),
            (LayoutConfig::new().with_child_spacing(-10.0), "child spacing"),
            (LayoutConfig::new().with_child_spacing(f64::INFINITY), "child spacing"),
            (LayoutConfig::new().with_min_box_width(f64::NAN), "min box width"),
        ];
        for (config, field) in cases {
            match config.validate() {
                Err(LayoutError::InvalidGeometry { what, .. }) => assert_eq!(what, field),
                other => panic!("expected invalid {}, got {:?}", field, other),
            }
        }
    }
}
