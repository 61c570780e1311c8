//! # grade-core
//!
//! Core types for scene-linear color grading.
//!
//! This crate provides the foundational types used throughout the grade-rs
//! workspace:
//!
//! - [`ImageBuf`] - Owned RGBA `f32` buffer with an explicit [`AlphaMode`]
//! - [`pixel`] - Per-pixel helpers (premultiply, luminance, non-finite handling)
//! - [`Error`] - Buffer and dimension errors
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. The buffer-level crates build
//! on it:
//!
//! ```text
//! grade-core (this crate)
//!    ^
//!    |
//!    +-- grade-ops (tone curves, stages, pipeline)
//!    +-- grade-cli
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Parallel pixel iteration with rayon (enabled by default)
//! - `serde` - Serialization for [`AlphaMode`] and [`NonFinitePolicy`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod pixel;

pub use error::{Error, Result};
pub use image::{ImageBuf, CHANNELS};
pub use pixel::{
    luminance_rec709, AlphaMode, NonFinitePolicy, Rgba, HALF_MAX, REC709_LUMA, REC709_LUMA_B,
    REC709_LUMA_G, REC709_LUMA_R,
};

/// Prelude module for convenient imports.
///
/// ```
/// use grade_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::ImageBuf;
    pub use crate::pixel::{luminance_rec709, AlphaMode, NonFinitePolicy, Rgba};
}
