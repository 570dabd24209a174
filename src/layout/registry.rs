//! Box registry: one layout pass over the visible area tree.
//!
//! The pass walks the domain graph depth-first from the focused root. Each
//! area on the current ancestry path is remembered; meeting it again produces
//! a [`OccurrenceKind::SelfReference`] box that is not expanded further. The
//! visited set is path-local, so an area reachable through two different
//! parents is laid out twice as a normal occurrence.
//!
//! Children tile their parent's child area left to right with equal widths.
//! A broken branch (unknown child id, failing collaborator, too little room)
//! is skipped with a [`LayoutWarning`]; the rest of the diagram still lays out.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::model::{AreaId, AreaSource};

use super::area_box::{AreaBox, OccurrenceKind, FREE_ZONE_FRACTION};
use super::config::LayoutConfig;
use super::error::{require_positive, LayoutError};
use super::transform::DiagramTransform;
use super::types::{Point, Rect};

/// A non-fatal problem found during a layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutWarning {
    pub category: WarningCategory,
    pub area: AreaId,
    pub parent: Option<AreaId>,
    pub message: String,
}

/// Category of layout warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCategory {
    /// A child reference points at an area the model does not know
    DanglingReference,
    /// The domain collaborator failed to answer
    Source,
    /// Children would be narrower than the configured minimum
    TooNarrow,
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningCategory::DanglingReference => write!(f, "dangling-reference"),
            WarningCategory::Source => write!(f, "source"),
            WarningCategory::TooNarrow => write!(f, "too-narrow"),
        }
    }
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// All boxes produced by one layout pass
#[derive(Debug, Clone, Default)]
pub struct BoxRegistry {
    boxes: Vec<AreaBox>,
    depths: Vec<usize>,
    by_area: HashMap<AreaId, Vec<usize>>,
    warnings: Vec<LayoutWarning>,
}

impl BoxRegistry {
    /// Lay out every area reachable from `root`
    pub fn layout(
        source: &dyn AreaSource,
        root: AreaId,
        config: &LayoutConfig,
    ) -> Result<Self, LayoutError> {
        Self::layout_with(source, root, config, |_| true)
    }

    /// Lay out from `root`, descending only into areas for which `is_expanded` holds
    ///
    /// Fails only when the geometry in `config` is invalid.
    pub fn layout_with(
        source: &dyn AreaSource,
        root: AreaId,
        config: &LayoutConfig,
        is_expanded: impl Fn(AreaId) -> bool,
    ) -> Result<Self, LayoutError> {
        config.validate()?;
        let mut pass = Pass {
            source,
            config,
            is_expanded,
            path: Vec::new(),
            registry: BoxRegistry::default(),
        };

        if source.contains(root) {
            let root_box = AreaBox::new(
                config.origin.x,
                config.origin.y,
                config.root_width,
                root,
                None,
                config.show_expanded_info,
                pass.kind_of(root),
            )?;
            pass.place(root_box, 0);
        } else {
            pass.warn(
                WarningCategory::DanglingReference,
                root,
                None,
                format!("root area {} is not in the model", root),
            );
        }

        let registry = pass.registry;
        debug!(
            boxes = registry.boxes.len(),
            warnings = registry.warnings.len(),
            "layout pass complete"
        );
        Ok(registry)
    }

    pub fn boxes(&self) -> &[AreaBox] {
        &self.boxes
    }

    /// Boxes paired with their nesting depth, in depth-first order
    pub fn iter_with_depth(&self) -> impl Iterator<Item = (&AreaBox, usize)> {
        self.boxes.iter().zip(self.depths.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    /// Every occurrence of `area`
    pub fn boxes_for(&self, area: AreaId) -> impl Iterator<Item = &AreaBox> {
        self.by_area
            .get(&area)
            .into_iter()
            .flatten()
            .map(move |&i| &self.boxes[i])
    }

    /// Occurrences of `area` in a given instantiation context
    pub fn lookup(
        &self,
        area: AreaId,
        parent: Option<AreaId>,
        reference: bool,
    ) -> impl Iterator<Item = &AreaBox> {
        self.boxes_for(area)
            .filter(move |b| b.parent_area == parent && b.is_reference_occurrence() == reference)
    }

    /// The innermost box containing a model-space point
    pub fn box_at(&self, point: Point) -> Option<&AreaBox> {
        // Children follow their parent in depth-first order.
        self.boxes.iter().rev().find(|b| b.contains(point))
    }

    /// The innermost box under a screen-space point
    pub fn hit_test(&self, screen: Point, transform: &DiagramTransform) -> Option<&AreaBox> {
        self.box_at(transform.to_model(screen))
    }

    /// Smallest rectangle containing every box, in model space
    pub fn bounds(&self) -> Rect {
        let mut rects = self.boxes.iter().map(AreaBox::full_rect);
        let Some(first) = rects.next() else {
            return Rect::zero();
        };
        rects.fold(first, |acc, r| acc.union(&r))
    }

    /// Rescale every box, e.g. when re-basing the diagram at a new zoom level
    ///
    /// Either every box is rescaled or none is.
    pub fn multiply(&mut self, factor: f64) -> Result<(), LayoutError> {
        require_positive("scale factor", factor)?;
        let scaled = self
            .boxes
            .iter()
            .map(|b| {
                let mut b = b.clone();
                b.multiply(factor)?;
                Ok(b)
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;
        self.boxes = scaled;
        Ok(())
    }
}

struct Pass<'a, F> {
    source: &'a dyn AreaSource,
    config: &'a LayoutConfig,
    is_expanded: F,
    /// Areas on the path from the root to the box being placed
    path: Vec<AreaId>,
    registry: BoxRegistry,
}

impl<F: Fn(AreaId) -> bool> Pass<'_, F> {
    fn kind_of(&self, area: AreaId) -> OccurrenceKind {
        if self.source.is_constructor(area) {
            OccurrenceKind::ConstructorArea
        } else {
            OccurrenceKind::Normal
        }
    }

    fn warn(
        &mut self,
        category: WarningCategory,
        area: AreaId,
        parent: Option<AreaId>,
        message: String,
    ) {
        warn!(%category, %area, "{}", message);
        self.registry.warnings.push(LayoutWarning {
            category,
            area,
            parent,
            message,
        });
    }

    fn push(&mut self, area_box: AreaBox, depth: usize) {
        let index = self.registry.boxes.len();
        self.registry
            .by_area
            .entry(area_box.area)
            .or_default()
            .push(index);
        self.registry.boxes.push(area_box);
        self.registry.depths.push(depth);
    }

    /// Record a normal occurrence and lay out its children
    fn place(&mut self, area_box: AreaBox, depth: usize) {
        let area = area_box.area;
        let child_area = area_box.child_area_rect();
        self.push(area_box, depth);

        if self.config.max_depth.is_some_and(|max| depth >= max) || !(self.is_expanded)(area) {
            return;
        }

        let children = match self.source.children(area) {
            Ok(children) => children,
            Err(e) => {
                self.warn(
                    WarningCategory::Source,
                    area,
                    None,
                    format!("cannot read children of {}: {}", area, e),
                );
                return;
            }
        };
        if children.is_empty() {
            return;
        }

        let Some(width) = self.tile_width(child_area, children.len()) else {
            self.warn(
                WarningCategory::TooNarrow,
                area,
                None,
                format!(
                    "no room for {} children of {} (child area {:.2} wide)",
                    children.len(),
                    area,
                    child_area.width
                ),
            );
            return;
        };

        let spacing = self.config.child_spacing;
        self.path.push(area);
        for (i, child) in children.into_iter().enumerate() {
            let x = child_area.x + spacing + i as f64 * (width + spacing);
            let y = child_area.y + spacing;
            self.visit_child(child, area, x, y, width, depth + 1);
        }
        self.path.pop();
    }

    fn visit_child(&mut self, child: AreaId, parent: AreaId, x: f64, y: f64, width: f64, depth: usize) {
        if !self.source.contains(child) {
            self.warn(
                WarningCategory::DanglingReference,
                child,
                Some(parent),
                format!("{} lists unknown child {}", parent, child),
            );
            return;
        }

        let recursive = child == parent || self.path.contains(&child);
        let kind = if recursive {
            OccurrenceKind::SelfReference
        } else {
            self.kind_of(child)
        };
        let area_box = match AreaBox::new(
            x,
            y,
            width,
            child,
            Some(parent),
            self.config.show_expanded_info,
            kind,
        ) {
            Ok(b) => b,
            Err(e) => {
                self.warn(
                    WarningCategory::TooNarrow,
                    child,
                    Some(parent),
                    format!("cannot place {} inside {}: {}", child, parent, e),
                );
                return;
            }
        };

        if recursive {
            debug!(area = %child, parent = %parent, "recursive occurrence, not expanded");
            self.push(area_box, depth);
        } else {
            self.place(area_box, depth);
        }
    }

    /// Equal width for `count` siblings inside `child_area`, if they fit
    fn tile_width(&self, child_area: Rect, count: usize) -> Option<f64> {
        let spacing = self.config.child_spacing;
        let n = count as f64;
        let by_width = (child_area.width - spacing * (n + 1.0)) / n;
        let by_height = (child_area.height - 2.0 * spacing) / (1.0 - FREE_ZONE_FRACTION);
        let width = by_width.min(by_height);
        let min = self.config.min_box_width.max(0.0);
        (width.is_finite() && width > 0.0 && width >= min).then_some(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AreaModel, AreaRecord, ModelError};

    fn config() -> LayoutConfig {
        LayoutConfig::new().with_root_width(100.0).with_min_box_width(1.0)
    }

    fn ids(registry: &BoxRegistry) -> Vec<u64> {
        registry.boxes().iter().map(|b| b.area.0).collect()
    }

    #[test]
    fn test_single_root() {
        let model = AreaModel::from_records([AreaRecord::new(1)]).unwrap();
        let registry = BoxRegistry::layout(&model, AreaId(1), &config()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.boxes()[0].width(), 100.0);
        assert!(registry.warnings().is_empty());
    }

    #[test]
    fn test_equal_width_tiling() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 3, 4]),
            AreaRecord::new(2),
            AreaRecord::new(3),
            AreaRecord::new(4),
        ])
        .unwrap();
        let cfg = LayoutConfig::new().with_root_width(1000.0);
        let registry = BoxRegistry::layout(&model, AreaId(1), &cfg).unwrap();
        assert_eq!(ids(&registry), vec![1, 2, 3, 4]);

        let parent = &registry.boxes()[0];
        let children = &registry.boxes()[1..];
        let expected = (parent.child_area_rect().width - 4.0 * 4.0) / 3.0;
        for (i, child) in children.iter().enumerate() {
            assert!((child.width() - expected).abs() < 1e-9);
            assert_eq!(child.parent_area, Some(AreaId(1)));
            assert!(parent.child_area_rect().contains_rect(&child.full_rect(), 1e-9));
            if i > 0 {
                assert!(child.x() > children[i - 1].full_rect().right());
            }
        }
    }

    #[test]
    fn test_single_child_fits_height() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2]),
            AreaRecord::new(2),
        ])
        .unwrap();
        let registry = BoxRegistry::layout(&model, AreaId(1), &config()).unwrap();
        let parent = &registry.boxes()[0];
        let child = &registry.boxes()[1];
        assert!(parent.child_area_rect().contains_rect(&child.full_rect(), 1e-9));
    }

    #[test]
    fn test_self_reference_terminates() {
        let model = AreaModel::from_records([AreaRecord::new(1).with_children([1])]).unwrap();
        let registry = BoxRegistry::layout(&model, AreaId(1), &config()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(AreaId(1), None, false).count(), 1);
        assert_eq!(registry.lookup(AreaId(1), Some(AreaId(1)), true).count(), 1);
    }

    #[test]
    fn test_indirect_cycle_is_flagged() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2]),
            AreaRecord::new(2).with_children([1]),
        ])
        .unwrap();
        let registry = BoxRegistry::layout(&model, AreaId(1), &config()).unwrap();
        assert_eq!(ids(&registry), vec![1, 2, 1]);
        assert!(registry.boxes()[2].is_reference_occurrence());
        assert!(!registry.boxes()[1].is_reference_occurrence());
    }

    #[test]
    fn test_shared_area_is_not_a_reference() {
        // 4 appears under both 2 and 3, but never twice on one path.
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 3]),
            AreaRecord::new(2).with_children([4]),
            AreaRecord::new(3).with_children([4]),
            AreaRecord::new(4),
        ])
        .unwrap();
        let cfg = LayoutConfig::new().with_root_width(1000.0);
        let registry = BoxRegistry::layout(&model, AreaId(1), &cfg).unwrap();
        let shared: Vec<_> = registry.boxes_for(AreaId(4)).collect();
        assert_eq!(shared.len(), 2);
        assert!(shared.iter().all(|b| !b.is_reference_occurrence()));
        assert_eq!(registry.lookup(AreaId(4), Some(AreaId(3)), false).count(), 1);
    }

    #[test]
    fn test_dangling_child_is_skipped() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 99, 3]),
            AreaRecord::new(2),
            AreaRecord::new(3),
        ])
        .unwrap();
        let registry = BoxRegistry::layout(&model, AreaId(1), &config()).unwrap();
        assert_eq!(ids(&registry), vec![1, 2, 3]);
        assert_eq!(registry.warnings().len(), 1);
        assert_eq!(
            registry.warnings()[0].category,
            WarningCategory::DanglingReference
        );
        assert_eq!(registry.warnings()[0].area, AreaId(99));
    }

    #[test]
    fn test_missing_root_yields_empty_registry() {
        let model = AreaModel::from_records([AreaRecord::new(1)]).unwrap();
        let registry = BoxRegistry::layout(&model, AreaId(5), &config()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.warnings().len(), 1);
    }

    #[test]
    fn test_invalid_root_width_fails() {
        let model = AreaModel::from_records([AreaRecord::new(1)]).unwrap();
        let cfg = LayoutConfig::new().with_root_width(0.0);
        assert!(matches!(
            BoxRegistry::layout(&model, AreaId(1), &cfg),
            Err(LayoutError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_invalid_spacing_fails() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 3]),
            AreaRecord::new(2),
            AreaRecord::new(3),
        ])
        .unwrap();
        let negative = config().with_child_spacing(-10.0);
        assert!(matches!(
            BoxRegistry::layout(&model, AreaId(1), &negative),
            Err(LayoutError::InvalidGeometry { what: "child spacing", .. })
        ));

        let nan_min = config().with_min_box_width(f64::NAN);
        assert!(matches!(
            BoxRegistry::layout(&model, AreaId(1), &nan_min),
            Err(LayoutError::InvalidGeometry { what: "min box width", .. })
        ));
    }

    #[test]
    fn test_zero_spacing_still_nests() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 3]),
            AreaRecord::new(2),
            AreaRecord::new(3),
        ])
        .unwrap();
        let cfg = config().with_child_spacing(0.0);
        let registry = BoxRegistry::layout(&model, AreaId(1), &cfg).unwrap();
        let parent = registry.boxes()[0].child_area_rect();
        for child in &registry.boxes()[1..] {
            assert!(parent.contains_rect(&child.full_rect(), 1e-9));
        }
    }

    #[test]
    fn test_too_narrow_children_are_dropped() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 3]),
            AreaRecord::new(2),
            AreaRecord::new(3),
        ])
        .unwrap();
        let cfg = config().with_min_box_width(50.0);
        let registry = BoxRegistry::layout(&model, AreaId(1), &cfg).unwrap();
        assert_eq!(ids(&registry), vec![1]);
        assert_eq!(registry.warnings()[0].category, WarningCategory::TooNarrow);
    }

    #[test]
    fn test_expansion_and_depth_limits() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2]),
            AreaRecord::new(2).with_children([3]),
            AreaRecord::new(3),
        ])
        .unwrap();
        let cfg = LayoutConfig::new().with_root_width(1000.0);

        let collapsed = BoxRegistry::layout_with(&model, AreaId(1), &cfg, |a| a != AreaId(2)).unwrap();
        assert_eq!(ids(&collapsed), vec![1, 2]);

        let shallow = BoxRegistry::layout(&model, AreaId(1), &cfg.clone().with_max_depth(1)).unwrap();
        assert_eq!(ids(&shallow), vec![1, 2]);
        assert_eq!(shallow.iter_with_depth().map(|(_, d)| d).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_constructor_area_kind() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2]),
            AreaRecord::new(2).constructor(),
        ])
        .unwrap();
        let registry = BoxRegistry::layout(&model, AreaId(1), &config()).unwrap();
        assert_eq!(registry.boxes()[1].occurrence, OccurrenceKind::ConstructorArea);
    }

    struct FailingSource;

    impl AreaSource for FailingSource {
        fn contains(&self, _area: AreaId) -> bool {
            true
        }
        fn children(&self, area: AreaId) -> Result<Vec<AreaId>, ModelError> {
            Err(ModelError::UnknownArea(area))
        }
        fn parent(&self, _area: AreaId) -> Result<Option<AreaId>, ModelError> {
            Ok(None)
        }
        fn inherits_from(&self, _area: AreaId, _ancestor: AreaId) -> Result<bool, ModelError> {
            Ok(false)
        }
    }

    #[test]
    fn test_source_failure_is_a_warning() {
        let registry = BoxRegistry::layout(&FailingSource, AreaId(1), &config()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.warnings()[0].category, WarningCategory::Source);
    }

    #[test]
    fn test_hit_testing_finds_innermost() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 3]),
            AreaRecord::new(2),
            AreaRecord::new(3),
        ])
        .unwrap();
        let cfg = LayoutConfig::new().with_root_width(1000.0);
        let registry = BoxRegistry::layout(&model, AreaId(1), &cfg).unwrap();
        let second = registry.boxes_for(AreaId(3)).next().unwrap().center();
        assert_eq!(registry.box_at(second).map(|b| b.area), Some(AreaId(3)));
        assert_eq!(registry.box_at(Point::new(1.0, 1.0)).map(|b| b.area), Some(AreaId(1)));
        assert!(registry.box_at(Point::new(-5.0, 0.0)).is_none());

        let mut transform = DiagramTransform::default();
        transform.set_zoom(2.0, Point::new(0.0, 0.0)).unwrap();
        transform.set_translation(10.0, 10.0).unwrap();
        let on_screen = transform.to_screen(second);
        assert_eq!(
            registry.hit_test(on_screen, &transform).map(|b| b.area),
            Some(AreaId(3))
        );
    }

    #[test]
    fn test_bounds_and_multiply() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2]),
            AreaRecord::new(2),
        ])
        .unwrap();
        let mut registry = BoxRegistry::layout(&model, AreaId(1), &config()).unwrap();
        let before = registry.bounds();
        assert_eq!(before, registry.boxes()[0].full_rect());
        registry.multiply(0.5).unwrap();
        assert!((registry.bounds().width - before.width * 0.5).abs() < 1e-9);
        assert!(registry.multiply(-2.0).is_err());
    }

    #[test]
    fn test_failed_multiply_leaves_registry_unchanged() {
        let model = AreaModel::from_records([
            AreaRecord::new(1).with_children([2, 3]),
            AreaRecord::new(2),
            AreaRecord::new(3),
        ])
        .unwrap();
        let cfg = config().with_origin(1e308, 0.0).with_root_width(1e308);
        let mut registry = BoxRegistry::layout(&model, AreaId(1), &cfg).unwrap();
        assert_eq!(registry.len(), 3);
        let before = registry.boxes().to_vec();

        // Root and first child still fit after scaling; the second child's x overflows.
        assert!(registry.multiply(1.5).is_err());
        assert_eq!(registry.boxes(), &before[..]);
    }
}
