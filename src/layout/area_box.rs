//! Coordinate model for a single area occurrence
//!
//! An [`AreaBox`] stores only `x`, `y` and `width`. Everything else (height,
//! label zone, child zone, font sizes, help icon) is derived on every call, so
//! the zones can never drift apart after [`AreaBox::multiply`].
//!
//! ```text
//! +---------------------------------+  -
//! |  label zone                  [?]|  | F * width
//! +------------------------+--------+  -
//! |                        |        |
//! |  child area            |  free  |
//! |                        |        |
//! +------------------------+--------+
//!                           <------>
//!                           F * width
//! ```
//!
//! with `F = FREE_ZONE_FRACTION` and a total height of `width * (1 - F)`.

use tracing::warn;

use crate::model::{AreaId, AreaSource};

use super::error::{require_finite, require_positive, LayoutError};
use super::types::{Point, Rect};

/// Fraction of the box width reserved for the label band and the free strip
pub const FREE_ZONE_FRACTION: f64 = 0.285;

const LABEL_FONT_FACTOR: f64 = 0.5;
const INFO_FONT_FACTOR: f64 = 0.3;
const DESCRIPTION_FONT_FACTOR: f64 = 0.25;
const REFERENCE_FONT_SCALE: f64 = 0.8;
const HELP_ICON_FACTOR: f64 = 0.5;
const HELP_ICON_INSET: f64 = 0.2;

/// Why a box exists in the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OccurrenceKind {
    /// A regular, expandable occurrence
    #[default]
    Normal,
    /// The area already appears on the same ancestry path; drawn as a terminal marker
    SelfReference,
    /// An area holding constructors
    ConstructorArea,
}

impl OccurrenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceKind::Normal => "normal",
            OccurrenceKind::SelfReference => "reference",
            OccurrenceKind::ConstructorArea => "constructor",
        }
    }
}

/// One positioned occurrence of an area in model space
#[derive(Debug, Clone, PartialEq)]
pub struct AreaBox {
    x: f64,
    y: f64,
    width: f64,
    pub area: AreaId,
    pub parent_area: Option<AreaId>,
    pub occurrence: OccurrenceKind,
    pub show_expanded_info: bool,
}

impl AreaBox {
    /// Create a box; `width` must be finite and positive
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        area: AreaId,
        parent_area: Option<AreaId>,
        show_expanded_info: bool,
        occurrence: OccurrenceKind,
    ) -> Result<Self, LayoutError> {
        Ok(Self {
            x: require_finite("x", x)?,
            y: require_finite("y", y)?,
            width: require_positive("width", width)?,
            area,
            parent_area,
            occurrence,
            show_expanded_info,
        })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.width * (1.0 - FREE_ZONE_FRACTION)
    }

    pub fn is_reference_occurrence(&self) -> bool {
        self.occurrence == OccurrenceKind::SelfReference
    }

    fn zone_size(&self) -> f64 {
        self.width * FREE_ZONE_FRACTION
    }

    pub fn full_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height())
    }

    /// The caption band across the top of the box
    pub fn label_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.zone_size())
    }

    /// The strip on the right of the body that stays clear of children
    pub fn free_rect(&self) -> Rect {
        let zone = self.zone_size();
        Rect::new(
            self.x + self.width - zone,
            self.y + zone,
            zone,
            self.height() - zone,
        )
    }

    /// The region child boxes are tiled into
    pub fn child_area_rect(&self) -> Rect {
        let zone = self.zone_size();
        Rect::new(
            self.x,
            self.y + zone,
            self.width - zone,
            self.height() - zone,
        )
    }

    pub fn center(&self) -> Point {
        self.full_rect().center()
    }

    pub fn label_center(&self) -> Point {
        self.label_rect().center()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.full_rect().contains(point)
    }

    pub fn label_font_size(&self) -> f64 {
        let size = self.zone_size() * LABEL_FONT_FACTOR;
        match self.occurrence {
            OccurrenceKind::SelfReference => size * REFERENCE_FONT_SCALE,
            OccurrenceKind::Normal | OccurrenceKind::ConstructorArea => size,
        }
    }

    pub fn info_font_size(&self) -> f64 {
        self.zone_size() * INFO_FONT_FACTOR
    }

    pub fn description_font_size(&self) -> f64 {
        self.zone_size() * DESCRIPTION_FONT_FACTOR
    }

    /// Square help icon in the top-right corner, inset by 20% of its own side
    pub fn help_icon_rect(&self) -> Rect {
        let size = self.zone_size() * HELP_ICON_FACTOR;
        let inset = size * HELP_ICON_INSET;
        Rect::new(self.x + self.width - size - inset, self.y + inset, size, size)
    }

    pub fn is_point_over_help_icon(&self, point: Point) -> bool {
        self.help_icon_rect().contains(point)
    }

    /// Rescale position and width in place
    ///
    /// The box is left untouched when the factor or the scaled geometry is
    /// invalid, e.g. when the width overflows to infinity or underflows to 0.
    pub fn multiply(&mut self, factor: f64) -> Result<(), LayoutError> {
        let factor = require_positive("scale factor", factor)?;
        let x = require_finite("x", self.x * factor)?;
        let y = require_finite("y", self.y * factor)?;
        let width = require_positive("width", self.width * factor)?;
        self.x = x;
        self.y = y;
        self.width = width;
        Ok(())
    }

    /// Whether this area inherits from the area containing it
    ///
    /// Collaborator failures are logged and reported as `false`.
    pub fn inherits_from_parent(&self, source: &dyn AreaSource) -> bool {
        let Some(parent) = self.parent_area else {
            return false;
        };
        match source.inherits_from(self.area, parent) {
            Ok(inherits) => inherits,
            Err(e) => {
                warn!(area = %self.area, parent = %parent, error = %e, "inheritance lookup failed");
                false
            }
        }
    }
}
