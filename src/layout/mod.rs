//! Area layout model
//!
//! Boxes are computed in model space by a [`BoxRegistry`] pass over the
//! domain graph; a [`DiagramTransform`] maps them to the screen for painting
//! and maps pointer positions back for hit testing.

pub mod area_box;
pub mod config;
pub mod error;
pub mod registry;
pub mod transform;
pub mod types;

pub use area_box::{AreaBox, OccurrenceKind, FREE_ZONE_FRACTION};
pub use config::LayoutConfig;
pub use error::LayoutError;
pub use registry::{BoxRegistry, LayoutWarning, WarningCategory};
pub use transform::{DiagramTransform, TransformState, ZoomRange};
pub use types::{Point, Rect};
