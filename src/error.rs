//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::LayoutError;
use crate::model::{AreaId, ModelError};
use crate::tree::TreeError;

/// Any error surfaced by the diagram core
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("tree state error: {0}")]
    Tree(#[from] TreeError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The model has no area to use as the diagram root
    #[error("no root area (requested {requested:?})")]
    NoRoot { requested: Option<AreaId> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_layout_error() {
        let err: DiagramError = LayoutError::non_positive("width", 0.0).into();
        assert!(err.to_string().starts_with("layout error: invalid geometry"));
    }

    #[test]
    fn test_no_root_display() {
        let err = DiagramError::NoRoot { requested: None };
        assert_eq!(err.to_string(), "no root area (requested None)");
    }
}
