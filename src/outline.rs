//! Plain-text outline of a laid out diagram

use crate::layout::{BoxRegistry, DiagramTransform, OccurrenceKind};
use crate::model::AreaSource;

/// One line per box, indented by depth, with screen-space geometry
///
/// ```text
/// Home (#1) x=0.0 y=0.0 w=200.0 h=143.0
///   Header (#2) x=4.0 y=61.0 w=65.5 h=46.8 [inherits]
/// ```
pub fn render_outline(
    registry: &BoxRegistry,
    source: &dyn AreaSource,
    transform: &DiagramTransform,
) -> String {
    let mut lines = Vec::with_capacity(registry.len());
    for (area_box, depth) in registry.iter_with_depth() {
        let rect = transform.to_screen_rect(area_box.full_rect());
        let mut tags = vec![];
        if area_box.occurrence != OccurrenceKind::Normal {
            tags.push(area_box.occurrence.as_str());
        }
        if area_box.inherits_from_parent(source) {
            tags.push("inherits");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        lines.push(format!(
            "{}{} ({}) x={:.1} y={:.1} w={:.1} h={:.1}{}",
            "  ".repeat(depth),
            source.name(area_box.area),
            area_box.area,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            tags
        ));
    }
    lines.join("\n")
}
