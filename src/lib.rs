//! Area Diagram - layout and tree-state core of a visual area editor
//!
//! This library lays out nested content areas as boxes, maps them between
//! model and screen space, and keeps tree-view expansion/selection stable
//! across rebuilds of the tree.
//!
//! # Example
//!
//! ```rust
//! use area_diagram::model::{AreaModel, AreaRecord};
//! use area_diagram::{Diagram, DiagramConfig, Point};
//!
//! let model = AreaModel::from_records([
//!     AreaRecord::new(1).named("Home").with_children([2]),
//!     AreaRecord::new(2).named("Header"),
//! ])
//! .unwrap();
//!
//! let diagram = Diagram::build(&model, None, &DiagramConfig::default()).unwrap();
//! assert_eq!(diagram.registry().len(), 2);
//! assert!(diagram.hit_test(Point::new(1.0, 1.0)).is_some());
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod outline;
pub mod tree;

pub use config::{ConfigError, DiagramConfig};
pub use error::DiagramError;
pub use layout::{
    AreaBox, BoxRegistry, DiagramTransform, LayoutConfig, LayoutError, OccurrenceKind, Point,
    Rect, TransformState, ZoomRange,
};
pub use outline::render_outline;
pub use tree::{IdPath, NodeId, TreeStateSnapshot, TreeView};

use model::{AreaId, AreaModel, AreaSource};
use tracing::debug;

/// A laid out diagram together with the view transform it is shown through
///
/// Relayout replaces the boxes but keeps the transform, so zoom and pan
/// survive a domain reload.
#[derive(Debug, Clone)]
pub struct Diagram {
    root: AreaId,
    registry: BoxRegistry,
    transform: DiagramTransform,
}

impl Diagram {
    /// Lay out `source` from `root`, or from the model root when `None`
    pub fn build(
        source: &AreaModel,
        root: Option<AreaId>,
        config: &DiagramConfig,
    ) -> Result<Self, DiagramError> {
        let root = root
            .or_else(|| source.root())
            .ok_or(DiagramError::NoRoot { requested: root })?;
        Self::build_from(source, root, config)
    }

    /// Lay out any [`AreaSource`] from `root`
    pub fn build_from(
        source: &dyn AreaSource,
        root: AreaId,
        config: &DiagramConfig,
    ) -> Result<Self, DiagramError> {
        let transform = DiagramTransform::new(config.zoom)?;
        let registry = BoxRegistry::layout(source, root, &config.layout)?;
        Ok(Self {
            root,
            registry,
            transform,
        })
    }

    /// Recompute every box, keeping the current transform
    pub fn relayout(
        &mut self,
        source: &dyn AreaSource,
        config: &LayoutConfig,
    ) -> Result<(), DiagramError> {
        self.registry = BoxRegistry::layout(source, self.root, config)?;
        debug!(root = %self.root, boxes = self.registry.len(), "relayout");
        Ok(())
    }

    pub fn root(&self) -> AreaId {
        self.root
    }

    pub fn registry(&self) -> &BoxRegistry {
        &self.registry
    }

    pub fn transform(&self) -> &DiagramTransform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut DiagramTransform {
        &mut self.transform
    }

    /// Restore a persisted zoom/pan, clamped to the current zoom range
    pub fn restore_view(&mut self, state: TransformState) -> Result<(), DiagramError> {
        self.transform = DiagramTransform::from_state(state, self.transform.range())?;
        Ok(())
    }

    /// The innermost box under a screen point
    pub fn hit_test(&self, screen: Point) -> Option<&AreaBox> {
        self.registry.hit_test(screen, &self.transform)
    }

    /// Whether a screen point is over the help icon of the box it hits
    pub fn is_over_help_icon(&self, screen: Point) -> bool {
        let model = self.transform.to_model(screen);
        self.registry
            .box_at(model)
            .is_some_and(|b| b.is_point_over_help_icon(model))
    }

    pub fn outline(&self, source: &dyn AreaSource) -> String {
        render_outline(&self.registry, source, &self.transform)
    }
}
