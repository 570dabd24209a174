//! Zoom and pan between model space and screen space.
//!
//! Boxes are laid out once in model space. Interactive zooming and panning
//! only change the [`DiagramTransform`], never the boxes themselves:
//!
//! ```text
//! screen = model * zoom + translation
//! model  = (screen - translation) / zoom
//! ```
//!
//! ## Zoom to cursor
//!
//! [`DiagramTransform::set_zoom`] takes a pivot in screen space. The model
//! point under the pivot before the zoom is still under the pivot afterwards,
//! which is what a mouse-wheel zoom is expected to do.
//!
//! ## Ownership
//!
//! A transform belongs to one open diagram view and is passed by reference to
//! layout and hit-testing calls. It is plain data with no interior mutability;
//! a multi-threaded host must confine mutation to a single owner.

use serde::{Deserialize, Serialize};

use super::error::{require_finite, require_positive, LayoutError};
use super::types::{Point, Rect};

/// Allowed zoom interval, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 10.0,
        }
    }
}

impl ZoomRange {
    /// Create a range; requires `0 < min <= max`
    pub fn new(min: f64, max: f64) -> Result<Self, LayoutError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let valid = self.min.is_finite()
            && self.max.is_finite()
            && self.min > 0.0
            && self.min <= self.max;
        if valid {
            Ok(())
        } else {
            Err(LayoutError::InvalidZoomRange {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Clamp `zoom` into the range
    ///
    /// Never panics, even on a range that fails [`ZoomRange::validate`].
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min).min(self.max)
    }
}

/// The persisted view state of a diagram
///
/// Stored by a collaborator as the ordered triple `(zoom, translation_x, translation_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub zoom: f64,
    pub translation_x: f64,
    pub translation_y: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            translation_x: 0.0,
            translation_y: 0.0,
        }
    }
}

impl TransformState {
    pub fn to_array(&self) -> [f64; 3] {
        [self.zoom, self.translation_x, self.translation_y]
    }

    pub fn from_array([zoom, translation_x, translation_y]: [f64; 3]) -> Self {
        Self {
            zoom,
            translation_x,
            translation_y,
        }
    }
}

/// Zoom and translation of one diagram view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramTransform {
    translation: Point,
    zoom: f64,
    range: ZoomRange,
}

impl Default for DiagramTransform {
    fn default() -> Self {
        Self {
            translation: Point::new(0.0, 0.0),
            zoom: 1.0,
            range: ZoomRange::default(),
        }
    }
}

impl DiagramTransform {
    /// Identity transform constrained to `range`
    pub fn new(range: ZoomRange) -> Result<Self, LayoutError> {
        range.validate()?;
        Ok(Self {
            translation: Point::new(0.0, 0.0),
            zoom: range.clamp(1.0),
            range,
        })
    }

    /// Restore a persisted state
    ///
    /// The zoom is clamped into `range`; a non-finite or non-positive zoom
    /// falls back to 1.0 (clamped) and non-finite translations to 0. Only an
    /// invalid `range` is an error.
    pub fn from_state(state: TransformState, range: ZoomRange) -> Result<Self, LayoutError> {
        range.validate()?;
        let zoom = require_positive("zoom", state.zoom).unwrap_or(1.0);
        Ok(Self {
            translation: Point::new(
                require_finite("translation x", state.translation_x).unwrap_or(0.0),
                require_finite("translation y", state.translation_y).unwrap_or(0.0),
            ),
            zoom: range.clamp(zoom),
            range,
        })
    }

    pub fn state(&self) -> TransformState {
        TransformState {
            zoom: self.zoom,
            translation_x: self.translation.x,
            translation_y: self.translation.y,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn translation(&self) -> Point {
        self.translation
    }

    pub fn range(&self) -> ZoomRange {
        self.range
    }

    pub fn to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.zoom + self.translation.x,
            point.y * self.zoom + self.translation.y,
        )
    }

    pub fn to_model(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.translation.x) / self.zoom,
            (point.y - self.translation.y) / self.zoom,
        )
    }

    /// Scale a length from model space to screen space
    pub fn to_screen_zoom(&self, value: f64) -> f64 {
        value * self.zoom
    }

    /// Scale a length from screen space to model space
    pub fn to_model_zoom(&self, value: f64) -> f64 {
        value / self.zoom
    }

    pub fn to_screen_rect(&self, rect: Rect) -> Rect {
        let origin = self.to_screen(Point::new(rect.x, rect.y));
        Rect::new(
            origin.x,
            origin.y,
            self.to_screen_zoom(rect.width),
            self.to_screen_zoom(rect.height),
        )
    }

    pub fn to_model_rect(&self, rect: Rect) -> Rect {
        let origin = self.to_model(Point::new(rect.x, rect.y));
        Rect::new(
            origin.x,
            origin.y,
            self.to_model_zoom(rect.width),
            self.to_model_zoom(rect.height),
        )
    }

    pub fn set_translation(&mut self, dx: f64, dy: f64) -> Result<(), LayoutError> {
        self.translation = Point::new(
            require_finite("translation x", dx)?,
            require_finite("translation y", dy)?,
        );
        Ok(())
    }

    /// Pan by a screen-space offset
    pub fn translate_by(&mut self, dx: f64, dy: f64) -> Result<(), LayoutError> {
        self.set_translation(self.translation.x + dx, self.translation.y + dy)
    }

    /// Set an absolute zoom, keeping the model point under `pivot` fixed on screen
    ///
    /// Out-of-range factors are clamped. Returns the zoom actually applied.
    pub fn set_zoom(&mut self, factor: f64, pivot: Point) -> Result<f64, LayoutError> {
        let factor = require_positive("zoom", factor)?;
        require_finite("pivot x", pivot.x)?;
        require_finite("pivot y", pivot.y)?;

        let anchor = self.to_model(pivot);
        self.zoom = self.range.clamp(factor);
        self.translation = Point::new(
            pivot.x - anchor.x * self.zoom,
            pivot.y - anchor.y * self.zoom,
        );
        Ok(self.zoom)
    }

    /// Multiply the current zoom, e.g. for one mouse-wheel notch
    pub fn zoom_by(&mut self, multiplier: f64, pivot: Point) -> Result<f64, LayoutError> {
        let multiplier = require_positive("zoom multiplier", multiplier)?;
        self.set_zoom(self.zoom * multiplier, pivot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS,
            "{:?} != {:?}",
            a,
            b
        );
    }

    fn transform(zoom: f64, tx: f64, ty: f64) -> DiagramTransform {
        let mut t = DiagramTransform::default();
        t.set_translation(tx, ty).unwrap();
        t.set_zoom(zoom, t.translation()).unwrap();
        t
    }

    #[test]
    fn test_identity() {
        let t = DiagramTransform::default();
        let p = Point::new(12.5, -3.0);
        assert_eq!(t.to_screen(p), p);
        assert_eq!(t.to_model(p), p);
    }

    #[test]
    fn test_to_screen_formula() {
        let t = transform(2.0, 10.0, 20.0);
        assert_eq!(t.zoom(), 2.0);
        assert_eq!(t.translation(), Point::new(10.0, 20.0));
        assert_eq!(t.to_screen(Point::new(5.0, 5.0)), Point::new(20.0, 30.0));
        assert_eq!(t.to_screen_zoom(3.0), 6.0);
        assert_eq!(t.to_model_zoom(6.0), 3.0);
    }

    #[test]
    fn test_round_trip() {
        for (zoom, tx, ty) in [(1.0, 0.0, 0.0), (0.37, -120.0, 44.5), (7.5, 3.25, -999.0)] {
            let t = transform(zoom, tx, ty);
            for p in [Point::new(0.0, 0.0), Point::new(-17.3, 250.0), Point::new(1e4, 1e-3)] {
                assert_close(t.to_model(t.to_screen(p)), p);
            }
        }
    }

    #[test]
    fn test_zoom_to_cursor_keeps_pivot_fixed() {
        let mut t = transform(1.5, 30.0, -12.0);
        let pivot = Point::new(200.0, 150.0);
        let under_cursor = t.to_model(pivot);
        t.set_zoom(4.0, pivot).unwrap();
        assert_close(t.to_screen(under_cursor), pivot);
        assert_close(t.to_screen(t.to_model(pivot)), pivot);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut t = DiagramTransform::new(ZoomRange::new(0.5, 2.0).unwrap()).unwrap();
        let pivot = Point::new(10.0, 10.0);
        assert_eq!(t.set_zoom(100.0, pivot).unwrap(), 2.0);
        assert_eq!(t.set_zoom(0.01, pivot).unwrap(), 0.5);
        assert_eq!(t.zoom_by(1.5, pivot).unwrap(), 0.75);
        assert!(t.set_zoom(-1.0, pivot).is_err());
        assert_eq!(t.zoom(), 0.75);
    }

    #[test]
    fn test_invalid_zoom_range() {
        assert!(ZoomRange::new(0.0, 1.0).is_err());
        assert!(ZoomRange::new(2.0, 1.0).is_err());
        assert!(ZoomRange::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_rect_mapping() {
        let t = transform(2.0, 5.0, 5.0);
        let r = Rect::new(1.0, 2.0, 10.0, 4.0);
        let screen = t.to_screen_rect(r);
        assert_eq!(screen, Rect::new(7.0, 9.0, 20.0, 8.0));
        assert_eq!(t.to_model_rect(screen), r);
    }

    #[test]
    fn test_state_round_trip() {
        let t = transform(2.5, -4.0, 8.0);
        let state = t.state();
        assert_eq!(state.to_array(), [2.5, -4.0, 8.0]);
        let restored =
            DiagramTransform::from_state(TransformState::from_array(state.to_array()), t.range())
                .unwrap();
        assert_eq!(restored, t);
    }

    #[test]
    fn test_from_state_sanitizes() {
        let state = TransformState {
            zoom: 500.0,
            translation_x: f64::NAN,
            translation_y: 3.0,
        };
        let t = DiagramTransform::from_state(state, ZoomRange::default()).unwrap();
        assert_eq!(t.zoom(), 10.0);
        assert_eq!(t.translation(), Point::new(0.0, 3.0));
    }

    #[test]
    fn test_inverted_range_is_an_error() {
        let inverted = ZoomRange { min: 5.0, max: 1.0 };
        assert_eq!(
            DiagramTransform::new(inverted),
            Err(LayoutError::InvalidZoomRange { min: 5.0, max: 1.0 })
        );
        assert!(DiagramTransform::from_state(TransformState::default(), inverted).is_err());

        let nan = ZoomRange { min: f64::NAN, max: 2.0 };
        assert!(DiagramTransform::new(nan).is_err());
        assert_eq!(nan.clamp(3.0), 2.0);
        assert_eq!(inverted.clamp(3.0), 1.0);
    }
}
