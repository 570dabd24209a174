//! Error types for the layout model

use thiserror::Error;

/// Errors that can occur while building or rescaling area boxes
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// A width, coordinate or scale factor that cannot describe a box
    #[error("invalid geometry: {what} must be {requirement}, got {value}")]
    InvalidGeometry {
        what: &'static str,
        requirement: &'static str,
        value: f64,
    },

    /// A zoom range that does not satisfy `0 < min <= max`
    #[error("invalid zoom range [{min}, {max}]")]
    InvalidZoomRange { min: f64, max: f64 },
}

impl LayoutError {
    /// Create an invalid geometry error for a value that must be finite and positive
    pub fn non_positive(what: &'static str, value: f64) -> Self {
        Self::InvalidGeometry {
            what,
            requirement: "finite and > 0",
            value,
        }
    }

    /// Create an invalid geometry error for a value that must be finite and not negative
    pub fn negative(what: &'static str, value: f64) -> Self {
        Self::InvalidGeometry {
            what,
            requirement: "finite and >= 0",
            value,
        }
    }

    /// Create an invalid geometry error for a value that must be finite
    pub fn non_finite(what: &'static str, value: f64) -> Self {
        Self::InvalidGeometry {
            what,
            requirement: "finite",
            value,
        }
    }
}

/// Validate that `value` is finite and strictly positive
pub(crate) fn require_positive(what: &'static str, value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::non_positive(what, value))
    }
}

/// Validate that `value` is finite and not negative
pub(crate) fn require_non_negative(what: &'static str, value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::negative(what, value))
    }
}

/// Validate that `value` is finite
pub(crate) fn require_finite(what: &'static str, value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LayoutError::non_finite(what, value))
    }
}
