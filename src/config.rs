//! Diagram configuration file support
//!
//! A configuration file is TOML; every key is optional:
//!
//! ```toml
//! [layout]
//! root_width = 1200.0
//! child_spacing = 6.0
//! max_depth = 4
//!
//! [zoom]
//! min = 0.25
//! max = 8.0
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{LayoutConfig, LayoutError, TransformState, ZoomRange};

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to write TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] LayoutError),
}

/// Layout and view settings for a diagram
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub layout: LayoutConfig,
    pub zoom: ZoomRange,
}

impl DiagramConfig {
    /// Parse and validate a configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: DiagramConfig = toml::from_str(content)?;
        config.zoom.validate()?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Parse a persisted zoom/pan record
///
/// ```toml
/// zoom = 1.5
/// translation_x = -40.0
/// translation_y = 12.0
/// ```
pub fn view_state_from_toml(content: &str) -> Result<TransformState, ConfigError> {
    Ok(toml::from_str(content)?)
}

pub fn view_state_to_toml(state: &TransformState) -> Result<String, ConfigError> {
    Ok(toml::to_string(state)?)
}

pub fn load_view_state(path: impl AsRef<Path>) -> Result<TransformState, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    view_state_from_toml(&content)
}

pub fn save_view_state(path: impl AsRef<Path>, state: &TransformState) -> Result<(), ConfigError> {
    std::fs::write(path, view_state_to_toml(state)?)?;
    Ok(())
}
