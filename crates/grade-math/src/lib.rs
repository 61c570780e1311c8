//! # grade-math
//!
//! Math utilities for scene-linear color grading.
//!
//! - [`Mat3`] - 3x3 matrices for color space transformations
//! - Interpolation and windowing ([`lerp`], [`smoothstep`], [`smootherstep`],
//!   [`pingpong`])
//! - Chromatic adaptation ([`adapt_matrix`], [`BRADFORD`])
//!
//! # Design
//!
//! All matrix operations assume **row-major** storage and **column vectors**:
//!
//! ```text
//! result = matrix * vector
//! ```
//!
//! Color triplets are plain `[f32; 3]` arrays.
//!
//! # Usage
//!
//! ```rust
//! use grade_math::Mat3;
//!
//! let rgb_to_xyz = Mat3::from_rows([
//!     [0.4124564, 0.3575761, 0.1804375],
//!     [0.2126729, 0.7151522, 0.0721750],
//!     [0.0193339, 0.1191920, 0.9503041],
//! ]);
//! let xyz = rgb_to_xyz.apply([1.0, 1.0, 1.0]);
//! assert!((xyz[1] - 1.0).abs() < 1e-4);
//! ```
//!
//! # Used By
//!
//! - `grade-color` - opponent space matrices, hue windows
//! - `grade-ops` - white balance, tone windows

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod adapt;
mod interp;
mod mat3;

pub use adapt::*;
pub use interp::*;
pub use mat3::*;
