//! # grade-color
//!
//! Color models and per-pixel color operators for scene-linear grading.
//!
//! - [`opponent`] - linear RGB to perceptual opponent space (L, A, B)
//! - [`hsv`] - HSV with hue in turns, HDR-safe
//! - [`hue_band`] - seven soft hue bands and their membership masks
//! - [`band_adjust`] - per-band hue, chroma and value correction
//! - [`saturation`] - HSV and opponent saturation, color boost
//! - [`tone_region`] - shadow, midtone and highlight masks
//! - [`blend`] - soft light and mixing helpers
//!
//! # Architecture
//!
//! ```text
//!  grade-ops
//!      |
//!  grade-color
//!      |
//!  grade-math
//! ```
//!
//! Every function here maps one pixel to one pixel, never fails and never
//! allocates. Validation of user parameters lives in the `validate`
//! methods and reports [`ColorError`].
//!
//! # Quick Start
//!
//! ```rust
//! use grade_color::band_adjust::BandAdjuster;
//! use grade_color::hue_band::BandId;
//! use grade_color::saturation::saturate;
//!
//! let mut hue = BandAdjuster::default();
//! hue.band_mut(BandId::Blue).hue_adjust = -0.05;
//!
//! let graded = saturate(hue.apply([0.1, 0.2, 0.8]), 1.2, 1.0);
//! assert!(graded.iter().all(|v| v.is_finite()));
//! ```
//!
//! # Feature Flags
//!
//! - `serde` - Serialize/Deserialize for parameter types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod band_adjust;
pub mod blend;
pub mod error;
pub mod hsv;
pub mod hue_band;
pub mod opponent;
pub mod saturation;
pub mod tone_region;

pub use band_adjust::BandAdjuster;
pub use error::{ColorError, ColorResult};
pub use hsv::{Hsv, hsv_to_rgb, rgb_to_hsv};
pub use hue_band::{BandId, BandMask, HueBand, band_mask};
pub use opponent::{Opponent, from_opponent, to_opponent};
pub use saturation::{color_boost, saturate};
pub use tone_region::{ToneMasks, ToneRanges};
