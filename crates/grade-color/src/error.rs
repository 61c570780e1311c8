//! Error types for color operations.
//!
//! The per-pixel functions in this crate are total and never fail. Errors
//! only come from parameter validation and from parsing band names.

use thiserror::Error;

/// Color operation error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ColorError {
    /// A parameter lies outside its documented range.
    #[error("{name} = {value} is out of range {range}")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
        /// Human readable valid range.
        range: &'static str,
    },

    /// A hue band name did not match any of the seven bands.
    #[error("unknown hue band: {0}")]
    UnknownBand(String),
}

impl ColorError {
    /// Checks `lo <= value <= hi`, rejecting NaN.
    pub fn check_range(
        name: &'static str,
        value: f32,
        lo: f32,
        hi: f32,
        range: &'static str,
    ) -> ColorResult<()> {
        if value.is_finite() && value >= lo && value <= hi {
            Ok(())
        } else {
            Err(Self::OutOfRange { name, value, range })
        }
    }
}

/// Result type for color operations.
pub type ColorResult<T> = Result<T, ColorError>;
