//! Pivoted contrast curve with separate highlight and shadow controls.
//!
//! Each control is a power curve through the pivot:
//!
//! ```text
//! y = pivot * (x / pivot)^gamma
//! ```
//!
//! - highlights: `gamma = 2^c` above the pivot
//! - shadows: `gamma = 2^-c` below the pivot
//! - total: `gamma = 2^c` everywhere
//!
//! They are chained in that order per channel. Each result is mixed with its
//! input by `saturate(|c| / 0.05)`, so small controls fade in smoothly and a
//! control of 0 is an exact no-op. Non-positive values pass through.

use grade_math::saturate;
use serde::{Deserialize, Serialize};

/// Smallest accepted pivot.
pub const MIN_PIVOT: f32 = 1e-4;

/// Control magnitude at which a curve reaches full strength.
pub const FADE_IN: f32 = 0.05;

/// Region a curve acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneRegion {
    /// Values above the pivot.
    Highlights,
    /// Values below the pivot.
    Shadows,
    /// All positive values.
    All,
}

/// Applies one pivoted power curve to a single value.
#[inline]
pub fn pivot_power(x: f32, control: f32, pivot: f32, region: ToneRegion) -> f32 {
    if control == 0.0 || x <= 0.0 {
        return x;
    }
    let pivot = pivot.max(MIN_PIVOT);
    let gamma = match region {
        ToneRegion::Highlights if x > pivot => control.exp2(),
        ToneRegion::Shadows if x < pivot => (-control).exp2(),
        ToneRegion::All => control.exp2(),
        _ => return x,
    };
    let y = pivot * (x / pivot).powf(gamma);
    let w = saturate(control.abs() / FADE_IN);
    x + (y - x) * w
}

/// Contrast controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneCurve {
    /// Contrast above the pivot, `[-1, 1]`.
    pub highlights: f32,
    /// Contrast below the pivot, `[-1, 1]`.
    pub shadows: f32,
    /// Overall contrast, `[-1, 1]`.
    pub total: f32,
    /// Fixed point of every curve, scene-linear.
    pub pivot: f32,
}

impl Default for ToneCurve {
    fn default() -> Self {
        Self {
            highlights: 0.0,
            shadows: 0.0,
            total: 0.0,
            pivot: 0.18,
        }
    }
}

impl ToneCurve {
    /// Returns true if every control is 0.
    pub fn is_identity(&self) -> bool {
        self.highlights == 0.0 && self.shadows == 0.0 && self.total == 0.0
    }

    /// Applies the chain to one channel value.
    #[inline]
    pub fn apply_value(&self, x: f32) -> f32 {
        let x = pivot_power(x, self.highlights, self.pivot, ToneRegion::Highlights);
        let x = pivot_power(x, self.shadows, self.pivot, ToneRegion::Shadows);
        pivot_power(x, self.total, self.pivot, ToneRegion::All)
    }

    /// Applies the chain to each RGB channel.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.is_identity() {
            return rgb;
        }
        rgb.map(|v| self.apply_value(v))
    }
}
