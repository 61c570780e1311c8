//! Soft shadow, midtone and highlight masks.
//!
//! Masks are driven by HSV value clamped to `[0, 1]` and use smootherstep
//! falloffs. The three masks are independent and do not sum to one.

use crate::error::{ColorError, ColorResult};
use grade_math::smootherstep;

/// Range controls for the three tone regions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToneRanges {
    /// Value at which the shadow mask reaches 0.
    pub shadow_range: f32,
    /// Distance from 0.5 at which the midtone mask reaches 0.
    pub midtone_range: f32,
    /// Width below 1 over which the highlight mask rises.
    pub highlight_range: f32,
}

impl Default for ToneRanges {
    fn default() -> Self {
        Self {
            shadow_range: 0.5,
            midtone_range: 0.5,
            highlight_range: 0.5,
        }
    }
}

/// Mask weights for one value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToneMasks {
    /// Shadow weight.
    pub shadow: f32,
    /// Midtone weight.
    pub midtone: f32,
    /// Highlight weight.
    pub highlight: f32,
}

impl ToneRanges {
    /// Evaluates all three masks at `value`.
    ///
    /// ```rust
    /// use grade_color::tone_region::ToneRanges;
    ///
    /// let m = ToneRanges::default().masks(0.0);
    /// assert_eq!((m.shadow, m.highlight), (1.0, 0.0));
    /// ```
    #[inline]
    pub fn masks(&self, value: f32) -> ToneMasks {
        let v = grade_math::saturate(value);
        ToneMasks {
            shadow: 1.0 - smootherstep(0.0, self.shadow_range, v),
            midtone: midtone_weight(v, self.midtone_range),
            highlight: smootherstep(1.0 - self.highlight_range, 1.0, v),
        }
    }

    /// Checks that every range lies in `[0.01, 1]`.
    pub fn validate(&self) -> ColorResult<()> {
        ColorError::check_range("shadow_range", self.shadow_range, 0.01, 1.0, "[0.01, 1]")?;
        ColorError::check_range("midtone_range", self.midtone_range, 0.01, 1.0, "[0.01, 1]")?;
        ColorError::check_range("highlight_range", self.highlight_range, 0.01, 1.0, "[0.01, 1]")
    }
}

/// Midtone mask: 1 at 0.5, falling to 0 at `0.5 ± range`.
#[inline]
pub fn midtone_weight(value: f32, range: f32) -> f32 {
    let v = grade_math::saturate(value);
    1.0 - smootherstep(0.0, range, (v - 0.5).abs())
}
