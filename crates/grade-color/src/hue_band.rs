//! Hue band membership.
//!
//! A hue band is a soft window on the hue circle. Seven bands with fixed
//! centers cover the circle:
//!
//! | Band   | Center (turns) |
//! |--------|----------------|
//! | Red    | 0.0            |
//! | Orange | 0.095          |
//! | Yellow | 0.167          |
//! | Green  | 0.33           |
//! | Teal   | 0.5            |
//! | Blue   | 0.67           |
//! | Pink   | 0.84           |
//!
//! Membership is measured on the circle, so a hue of 0.999 is as close to
//! Red as a hue of 0.001.
//!
//! # Example
//!
//! ```rust
//! use grade_color::hue_band::{band_mask, BandId};
//!
//! let near = band_mask(0.001, BandId::Red.center(), 0.08, 1.0);
//! let wrapped = band_mask(0.999, BandId::Red.center(), 0.08, 1.0);
//! assert!((near.weight - wrapped.weight).abs() < 1e-4);
//! ```

use crate::error::{ColorError, ColorResult};
use grade_math::{mix, pingpong, smoothstep, wrap_signed};
use std::fmt;
use std::str::FromStr;

/// Default half-width of a band, in turns.
pub const DEFAULT_RANGE: f32 = 0.08;

/// Default window softness.
pub const DEFAULT_SMOOTHING: f32 = 1.0;

/// Number of hue bands.
pub const BAND_COUNT: usize = 7;

/// Identifies one of the seven hue bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BandId {
    /// Red, centered at 0.
    Red,
    /// Orange, centered at 0.095.
    Orange,
    /// Yellow, centered at 0.167.
    Yellow,
    /// Green, centered at 0.33.
    Green,
    /// Teal, centered at 0.5.
    Teal,
    /// Blue, centered at 0.67.
    Blue,
    /// Pink, centered at 0.84.
    Pink,
}

impl BandId {
    /// All bands in processing order.
    pub const ALL: [BandId; BAND_COUNT] = [
        BandId::Red,
        BandId::Orange,
        BandId::Yellow,
        BandId::Green,
        BandId::Teal,
        BandId::Blue,
        BandId::Pink,
    ];

    /// Center hue in turns.
    pub const fn center(self) -> f32 {
        match self {
            BandId::Red => 0.0,
            BandId::Orange => 0.095,
            BandId::Yellow => 0.167,
            BandId::Green => 0.33,
            BandId::Teal => 0.5,
            BandId::Blue => 0.67,
            BandId::Pink => 0.84,
        }
    }

    /// Lowercase band name.
    pub const fn name(self) -> &'static str {
        match self {
            BandId::Red => "red",
            BandId::Orange => "orange",
            BandId::Yellow => "yellow",
            BandId::Green => "green",
            BandId::Teal => "teal",
            BandId::Blue => "blue",
            BandId::Pink => "pink",
        }
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BandId {
    type Err = ColorError;

    fn from_str(s: &str) -> ColorResult<Self> {
        BandId::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ColorError::UnknownBand(s.to_string()))
    }
}

/// Membership of a hue in one band.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandMask {
    /// Soft membership in `[0, 1]`.
    pub weight: f32,
    /// Signed distance from the center normalized by the range, in `[-1, 1]`.
    pub offset: f32,
}

impl BandMask {
    /// `1 - |offset|`: 1 at the band center, 0 at its edge.
    #[inline]
    pub fn proximity(&self) -> f32 {
        1.0 - self.offset.abs()
    }
}

/// Computes the membership of hue `hue` in a band centered at `center`.
///
/// * `range` - half-width of the band in turns
/// * `smoothing` - 0 gives a plateau with a short falloff over the last
///   10% of the range, 1 gives a smooth bell over the full range
pub fn band_mask(hue: f32, center: f32, range: f32, smoothing: f32) -> BandMask {
    let range = range.max(1e-6);
    let d = pingpong(hue - center, 0.5);
    let sharp = 1.0 - smoothstep(range * 0.9, range, d);
    let smooth = 1.0 - smoothstep(0.0, range, d);
    let weight = mix(sharp, smooth, smoothing.clamp(0.0, 1.0));
    let offset = (wrap_signed(hue - center) / range).clamp(-1.0, 1.0);
    BandMask { weight, offset }
}

/// One band's controls.
///
/// The default is an identity band: no hue shift, unit chroma and value
/// scales, default range and smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HueBand {
    /// Hue rotation in turns at full membership.
    pub hue_adjust: f32,
    /// Chroma (saturation) multiplier at full membership.
    pub chroma_scale: f32,
    /// Value multiplier at full membership.
    pub value_scale: f32,
    /// Half-width of the band in turns.
    pub range: f32,
    /// Window softness in `[0, 1]`.
    pub smoothing: f32,
}

impl Default for HueBand {
    fn default() -> Self {
        Self {
            hue_adjust: 0.0,
            chroma_scale: 1.0,
            value_scale: 1.0,
            range: DEFAULT_RANGE,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl HueBand {
    /// Returns true if the band changes nothing.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.hue_adjust == 0.0 && self.chroma_scale == 1.0 && self.value_scale == 1.0
    }

    /// Membership of `hue` in this band centered at `center`.
    #[inline]
    pub fn mask(&self, hue: f32, center: f32) -> BandMask {
        band_mask(hue, center, self.range, self.smoothing)
    }

    /// Checks documented ranges.
    pub fn validate(&self) -> ColorResult<()> {
        ColorError::check_range("hue_adjust", self.hue_adjust, -0.5, 0.5, "[-0.5, 0.5]")?;
        ColorError::check_range("chroma_scale", self.chroma_scale, 0.0, 4.0, "[0, 4]")?;
        ColorError::check_range("value_scale", self.value_scale, 0.0, 4.0, "[0, 4]")?;
        ColorError::check_range("range", self.range, 0.001, 0.5, "[0.001, 0.5]")?;
        ColorError::check_range("smoothing", self.smoothing, 0.0, 1.0, "[0, 1]")
    }
}

/// Membership of a hue in all seven bands with default range and smoothing.
pub fn all_band_masks(hue: f32) -> [BandMask; BAND_COUNT] {
    BandId::ALL.map(|b| band_mask(hue, b.center(), DEFAULT_RANGE, DEFAULT_SMOOTHING))
}
