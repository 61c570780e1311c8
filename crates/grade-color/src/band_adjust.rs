//! Per-band hue, chroma and value correction.
//!
//! [`BandAdjuster`] walks the seven hue bands in fixed order (Red, Orange,
//! Yellow, Green, Teal, Blue, Pink). Each band measures membership against
//! the color as left by the previous bands, so a band that rotates reds into
//! orange hands those pixels to the Orange band.
//!
//! Two renditions are computed and mixed by `perceptual`:
//!
//! - **HSV**: hue, saturation and value edited directly.
//! - **Opponent**: hue rotated and chroma scaled in the (A, B) plane. The
//!   accumulated value multiplier scales HSV value (linear RGB) once all
//!   bands have run.
//!
//! Band membership is always measured on the HSV hue of the current color,
//! so both renditions select the same pixels. Achromatic pixels have no hue
//! and are faded out of every band below [`NEUTRAL_SATURATION`].

use crate::error::ColorResult;
use crate::hsv::{Hsv, hsv_to_rgb, rgb_to_hsv};
use crate::hue_band::{BAND_COUNT, BandId, BandMask, HueBand};
use crate::opponent::{Opponent, from_opponent, to_opponent};
use grade_math::{fract, smoothstep};
use std::f32::consts::TAU;

/// HSV saturation below which band edits fade out.
pub const NEUTRAL_SATURATION: f32 = 0.02;

/// Seven-band hue corrector.
///
/// # Example
///
/// ```rust
/// use grade_color::band_adjust::BandAdjuster;
/// use grade_color::hue_band::BandId;
///
/// let mut adj = BandAdjuster::default();
/// adj.band_mut(BandId::Red).chroma_scale = 0.0;
/// let out = adj.apply([1.0, 0.0, 0.0]);
/// assert!((out[1] - out[0]).abs() < 0.05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BandAdjuster {
    /// Band controls in [`BandId::ALL`] order.
    pub bands: [HueBand; BAND_COUNT],
    /// 0 = HSV only, 1 = opponent only.
    pub perceptual: f32,
}

impl Default for BandAdjuster {
    fn default() -> Self {
        Self {
            bands: [HueBand::default(); BAND_COUNT],
            perceptual: 1.0,
        }
    }
}

#[inline]
fn neutral_gate(s: f32) -> f32 {
    smoothstep(0.0, NEUTRAL_SATURATION, s)
}

impl BandAdjuster {
    /// Controls for one band.
    pub fn band(&self, id: BandId) -> &HueBand {
        &self.bands[id as usize]
    }

    /// Mutable controls for one band.
    pub fn band_mut(&mut self, id: BandId) -> &mut HueBand {
        &mut self.bands[id as usize]
    }

    /// Returns true if no band changes anything.
    pub fn is_identity(&self) -> bool {
        self.bands.iter().all(HueBand::is_identity)
    }

    /// Checks every band and the perceptual mix.
    pub fn validate(&self) -> ColorResult<()> {
        crate::ColorError::check_range("perceptual", self.perceptual, 0.0, 1.0, "[0, 1]")?;
        self.bands.iter().try_for_each(HueBand::validate)
    }

    /// Membership of `rgb` in every band, using each band's own range.
    pub fn masks(&self, rgb: [f32; 3]) -> [BandMask; BAND_COUNT] {
        let hsv = rgb_to_hsv(rgb);
        let mut out = [BandMask::default(); BAND_COUNT];
        for (i, id) in BandId::ALL.into_iter().enumerate() {
            out[i] = self.bands[i].mask(hsv.h, id.center());
        }
        out
    }

    /// Applies the correction to linear RGB.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        if self.is_identity() {
            return rgb;
        }
        let t = self.perceptual.clamp(0.0, 1.0);
        if t <= 0.0 {
            return self.apply_hsv(rgb);
        }
        if t >= 1.0 {
            return self.apply_opponent(rgb);
        }
        let a = self.apply_hsv(rgb);
        let b = self.apply_opponent(rgb);
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ]
    }

    /// HSV rendition.
    pub fn apply_hsv(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut hsv = rgb_to_hsv(rgb);
        let mut touched = false;
        for (band, id) in self.bands.iter().zip(BandId::ALL) {
            if band.is_identity() {
                continue;
            }
            let m = band.mask(hsv.h, id.center());
            let factor = m.weight * neutral_gate(hsv.s);
            if factor <= 0.0 {
                continue;
            }
            touched = true;
            hsv = Hsv {
                h: fract(hsv.h + band.hue_adjust * factor * m.proximity()),
                s: hsv.s * (1.0 + (band.chroma_scale - 1.0) * factor),
                v: hsv.v * (1.0 + (band.value_scale - 1.0) * factor),
            };
        }
        if touched { hsv_to_rgb(hsv) } else { rgb }
    }

    /// Opponent-space rendition.
    pub fn apply_opponent(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut lab: Opponent = to_opponent(rgb);
        let mut current = rgb;
        let mut value = 1.0;
        let mut touched = false;
        for (band, id) in self.bands.iter().zip(BandId::ALL) {
            if band.is_identity() {
                continue;
            }
            let hsv = rgb_to_hsv(current);
            let m = band.mask(hsv.h, id.center());
            let factor = m.weight * neutral_gate(hsv.s);
            if factor <= 0.0 {
                continue;
            }
            touched = true;
            let (chroma, angle) = lab.chroma_hue();
            let angle = angle + band.hue_adjust * TAU * factor * m.proximity();
            let chroma = chroma * (1.0 + (band.chroma_scale - 1.0) * factor);
            lab = lab.with_chroma_hue(chroma, angle);
            value *= 1.0 + (band.value_scale - 1.0) * factor;
            current = from_opponent(lab);
        }
        if !touched {
            return rgb;
        }
        let out = from_opponent(lab);
        [out[0] * value, out[1] * value, out[2] * value]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_exact() {
        let adj = BandAdjuster::default();
        let rgb = [0.7, 0.2, 0.05];
        assert_eq!(adj.apply(rgb), rgb);
    }

    #[test]
    fn test_gray_untouched() {
        let mut adj = BandAdjuster::default();
        adj.band_mut(BandId::Red).value_scale = 2.0;
        adj.band_mut(BandId::Red).hue_adjust = 0.2;
        let gray = [0.18, 0.18, 0.18];
        assert_eq!(adj.apply(gray), gray);
        adj.perceptual = 0.0;
        assert_eq!(adj.apply(gray), gray);
    }

    #[test]
    fn test_value_scale_red() {
        let mut adj = BandAdjuster::default();
        adj.perceptual = 0.0;
        adj.band_mut(BandId::Red).value_scale = 0.5;
        let out = adj.apply([1.0, 0.0, 0.0]);
        assert_relative_eq!(out[0], 0.5, epsilon = 1e-5);

        let blue = [0.0, 0.0, 1.0];
        assert_eq!(adj.apply(blue), blue);
    }

    #[test]
    fn test_value_scale_matches_across_renditions() {
        let mut adj = BandAdjuster::default();
        adj.band_mut(BandId::Red).value_scale = 0.5;
        let rgb = [0.8, 0.2, 0.2];
        adj.perceptual = 0.0;
        let hsv = adj.apply(rgb);
        adj.perceptual = 1.0;
        let opp = adj.apply(rgb);
        for c in 0..3 {
            assert_relative_eq!(hsv[c], opp[c], epsilon = 1e-3);
        }
        assert_relative_eq!(opp[0], 0.4, epsilon = 1e-3);
        assert_relative_eq!(rgb_to_hsv(opp).h, rgb_to_hsv(rgb).h, epsilon = 1e-3);
    }

    #[test]
    fn test_hue_rotation_hsv() {
        let mut adj = BandAdjuster::default();
        adj.perceptual = 0.0;
        adj.band_mut(BandId::Green).hue_adjust = 0.05;
        let out = adj.apply([0.0, 1.0, 0.0]);
        let hsv = rgb_to_hsv(out);
        assert!(hsv.h > 0.36 && hsv.h < 0.4, "{}", hsv.h);
    }

    #[test]
    fn test_opponent_desaturate() {
        let mut adj = BandAdjuster::default();
        adj.band_mut(BandId::Red).chroma_scale = 0.0;
        let lab_in = to_opponent([0.9, 0.02, 0.01]);
        let lab_out = to_opponent(adj.apply([0.9, 0.02, 0.01]));
        assert!(lab_out.chroma() < lab_in.chroma() * 0.1);
        assert_relative_eq!(lab_out.l, lab_in.l, epsilon = 1e-4);
    }

    #[test]
    fn test_later_bands_observe_earlier() {
        let mut adj = BandAdjuster::default();
        adj.perceptual = 0.0;
        // Red pushed to orange, orange then desaturated
        adj.band_mut(BandId::Red).hue_adjust = 0.095;
        adj.band_mut(BandId::Red).range = 0.05;
        adj.band_mut(BandId::Orange).chroma_scale = 0.0;
        let out = adj.apply([1.0, 0.0, 0.0]);
        assert!(rgb_to_hsv(out).s < 0.1);
    }

    #[test]
    fn test_masks_use_band_range() {
        let mut adj = BandAdjuster::default();
        adj.band_mut(BandId::Red).range = 0.2;
        let masks = adj.masks([1.0, 0.3, 0.0]);
        assert!(masks[BandId::Red as usize].weight > 0.0);
        assert!(masks[BandId::Blue as usize].weight == 0.0);
    }
}
