//! Per-pixel color stages: boost, white balance, exposure, contrast,
//! saturation, density and hue correction.

use crate::parallel::map_rgb;
use crate::stage::{StageContext, StageOp};
use crate::tone_curve::{MIN_PIVOT, ToneCurve};
use crate::{OpsError, OpsResult};
use grade_color::band_adjust::BandAdjuster;
use grade_color::saturation::{color_boost, saturate};
use grade_color::tone_region::ToneRanges;
use grade_color::rgb_to_hsv;
use grade_core::ImageBuf;
use grade_math::{D65_XY, Mat3, rec709_adapt_matrix, xy_to_xyz};
use serde::{Deserialize, Serialize};

/// Chromaticity shift per unit of temperature, roughly along the Planckian
/// locus through D65 (positive is warmer).
pub const TEMPERATURE_AXIS: [f32; 2] = [0.0678, 0.0478];

/// Chromaticity shift per unit of tint, perpendicular to the temperature
/// axis (positive is magenta).
pub const TINT_AXIS: [f32; 2] = [0.0478, -0.0678];

/// Content-adaptive saturation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorBoost {
    /// `> 0` lifts muted colors, `< 0` mutes saturated ones. `[-1, 1]`.
    pub strength: f32,
    /// HSV (0) to opponent (1) mix.
    pub perceptual: f32,
}

impl Default for ColorBoost {
    fn default() -> Self {
        Self {
            strength: 0.0,
            perceptual: 1.0,
        }
    }
}

impl StageOp for ColorBoost {
    const NAME: &'static str = "color_boost";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "strength", self.strength, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "perceptual", self.perceptual, 0.0, 1.0)
    }

    fn is_identity(&self) -> bool {
        self.strength == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| {
            color_boost(rgb, self.strength, self.perceptual)
        })
    }
}

/// Temperature and tint by chromatic adaptation.
///
/// The image is treated as balanced for D65 and adapted (Bradford) to a
/// white point moved by `temperature` and `tint`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteBalance {
    /// Warm (+) / cool (-), `[-1, 1]`.
    pub temperature: f32,
    /// Magenta (+) / green (-), `[-1, 1]`.
    pub tint: f32,
}

impl WhiteBalance {
    /// Target white chromaticity.
    pub fn target_xy(&self) -> [f32; 2] {
        [
            D65_XY[0] + self.temperature * TEMPERATURE_AXIS[0] + self.tint * TINT_AXIS[0],
            D65_XY[1] + self.temperature * TEMPERATURE_AXIS[1] + self.tint * TINT_AXIS[1],
        ]
    }

    /// Linear Rec.709 adaptation matrix.
    pub fn matrix(&self) -> Mat3 {
        rec709_adapt_matrix(xy_to_xyz(D65_XY), xy_to_xyz(self.target_xy()))
    }
}

impl StageOp for WhiteBalance {
    const NAME: &'static str = "white_balance";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "temperature", self.temperature, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "tint", self.tint, -1.0, 1.0)
    }

    fn is_identity(&self) -> bool {
        self.temperature == 0.0 && self.tint == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let m = self.matrix();
        map_rgb(img, blend, ctx.cancel, |rgb| m.apply(rgb))
    }
}

/// `rgb * 2^stops + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Exposure {
    /// Exposure in stops, `[-16, 16]`.
    pub stops: f32,
    /// Added after scaling, `[-1, 1]`.
    pub offset: f32,
}

impl StageOp for Exposure {
    const NAME: &'static str = "exposure";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "stops", self.stops, -16.0, 16.0)?;
        OpsError::check(Self::NAME, "offset", self.offset, -1.0, 1.0)
    }

    fn is_identity(&self) -> bool {
        self.stops == 0.0 && self.offset == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let gain = self.stops.exp2();
        map_rgb(img, blend, ctx.cancel, |rgb| rgb.map(|v| v * gain + self.offset))
    }
}

impl StageOp for ToneCurve {
    const NAME: &'static str = "contrast";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "highlights", self.highlights, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "shadows", self.shadows, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "total", self.total, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "pivot", self.pivot, MIN_PIVOT, 16.0)
    }

    fn is_identity(&self) -> bool {
        ToneCurve::is_identity(self)
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| ToneCurve::apply(self, rgb))
    }
}

impl StageOp for BandAdjuster {
    const NAME: &'static str = "hue_correct";

    fn validate(&self) -> OpsResult<()> {
        BandAdjuster::validate(self).map_err(|e| OpsError::from_color(Self::NAME, e))
    }

    fn is_identity(&self) -> bool {
        BandAdjuster::is_identity(self)
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| BandAdjuster::apply(self, rgb))
    }
}

/// Global saturation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Saturation {
    /// Saturation multiplier, `[0, 4]`.
    pub factor: f32,
    /// HSV (0) to opponent (1) mix.
    pub perceptual: f32,
}

impl Default for Saturation {
    fn default() -> Self {
        Self {
            factor: 1.0,
            perceptual: 1.0,
        }
    }
}

impl StageOp for Saturation {
    const NAME: &'static str = "saturation";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "factor", self.factor, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "perceptual", self.perceptual, 0.0, 1.0)
    }

    fn is_identity(&self) -> bool {
        self.factor == 1.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| saturate(rgb, self.factor, self.perceptual))
    }
}

/// Saturation per tone region.
///
/// The factor applied to a pixel is
/// `1 + sum((f_region - 1) * mask_region(V))` with masks from the pixel's
/// HSV value.
///
/// Caveat: the masks are measured before saturation changes the pixel, and
/// saturation itself moves HSV value, so neighbouring pixels near a mask
/// edge can end up on different sides of it. The result is slightly
/// different from saturating each region separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueSaturation {
    /// Shadow saturation, `[0, 4]`.
    pub shadows: f32,
    /// Midtone saturation, `[0, 4]`.
    pub midtones: f32,
    /// Highlight saturation, `[0, 4]`.
    pub highlights: f32,
    /// Tone-region mask widths.
    pub ranges: ToneRanges,
    /// HSV (0) to opponent (1) mix.
    pub perceptual: f32,
}

impl Default for ValueSaturation {
    fn default() -> Self {
        Self {
            shadows: 1.0,
            midtones: 1.0,
            highlights: 1.0,
            ranges: ToneRanges::default(),
            perceptual: 1.0,
        }
    }
}

impl ValueSaturation {
    /// Saturation factor for one pixel.
    pub fn factor(&self, rgb: [f32; 3]) -> f32 {
        let m = self.ranges.masks(rgb_to_hsv(rgb).v);
        1.0 + (self.shadows - 1.0) * m.shadow
            + (self.midtones - 1.0) * m.midtone
            + (self.highlights - 1.0) * m.highlight
    }
}

impl StageOp for ValueSaturation {
    const NAME: &'static str = "value_saturation";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "shadows", self.shadows, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "midtones", self.midtones, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "highlights", self.highlights, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "perceptual", self.perceptual, 0.0, 1.0)?;
        self.ranges.validate().map_err(|e| OpsError::from_color(Self::NAME, e))
    }

    fn is_identity(&self) -> bool {
        self.shadows == 1.0 && self.midtones == 1.0 && self.highlights == 1.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| {
            saturate(rgb, self.factor(rgb).max(0.0), self.perceptual)
        })
    }
}

/// Subtractive density: saturated colors get darker.
///
/// HSV value is scaled by `1 - 0.5 * amount * S`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Density {
    /// `[0, 1]`.
    pub amount: f32,
}

impl StageOp for Density {
    const NAME: &'static str = "density";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "amount", self.amount, 0.0, 1.0)
    }

    fn is_identity(&self) -> bool {
        self.amount == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| {
            let s = rgb_to_hsv(rgb).s.clamp(0.0, 1.0);
            let k = 1.0 - 0.5 * self.amount * s;
            rgb.map(|v| v * k)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_util::apply_op;
    use approx::assert_abs_diff_eq;
    use grade_color::BandId;

    #[test]
    fn test_exposure() {
        let out = apply_op(&Exposure { stops: 1.0, offset: 0.0 }, [0.25, 0.5, 1.0, 0.5], 1.0);
        assert_eq!(out, [0.5, 1.0, 2.0, 0.5]);
        let half = apply_op(&Exposure { stops: 1.0, offset: 0.0 }, [0.25, 0.5, 1.0, 1.0], 0.5);
        assert_eq!(half, [0.375, 0.75, 1.5, 1.0]);
    }

    #[test]
    fn test_white_balance_warm() {
        let wb = WhiteBalance {
            temperature: 0.5,
            tint: 0.0,
        };
        let out = apply_op(&wb, [0.5, 0.5, 0.5, 1.0], 1.0);
        assert!(out[0] > out[2]);

        let cool = WhiteBalance {
            temperature: -0.5,
            tint: 0.0,
        };
        let out = apply_op(&cool, [0.5, 0.5, 0.5, 1.0], 1.0);
        assert!(out[2] > out[0]);
    }

    #[test]
    fn test_white_balance_tint() {
        let wb = WhiteBalance {
            temperature: 0.0,
            tint: -0.5,
        };
        let out = apply_op(&wb, [0.5, 0.5, 0.5, 1.0], 1.0);
        assert!(out[1] > out[0] && out[1] > out[2]);
    }

    #[test]
    fn test_white_balance_near_identity() {
        let m = WhiteBalance::default().matrix();
        assert!(m.max_abs_diff(&Mat3::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_color_boost_stage() {
        let boost = ColorBoost {
            strength: 0.5,
            perceptual: 0.0,
        };
        let px = [0.5, 0.4, 0.4, 1.0];
        let out = apply_op(&boost, px, 1.0);
        let s_in = rgb_to_hsv([px[0], px[1], px[2]]).s;
        let s_out = rgb_to_hsv([out[0], out[1], out[2]]).s;
        assert!(s_out > s_in);
    }

    #[test]
    fn test_saturation_zero_gray() {
        let sat = Saturation {
            factor: 0.0,
            perceptual: 0.0,
        };
        let out = apply_op(&sat, [0.8, 0.2, 0.1, 1.0], 1.0);
        assert_abs_diff_eq!(out[0], out[1], epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], out[2], epsilon = 1e-6);
    }

    #[test]
    fn test_value_saturation_regions() {
        let vs = ValueSaturation {
            shadows: 0.0,
            ..Default::default()
        };
        assert_abs_diff_eq!(vs.factor([0.0, 0.0, 0.0]), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(vs.factor([1.0, 0.5, 0.5]), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_density() {
        let d = Density { amount: 1.0 };
        let out = apply_op(&d, [1.0, 0.0, 0.0, 1.0], 1.0);
        assert_abs_diff_eq!(out[0], 0.5, epsilon = 1e-6);
        let gray = apply_op(&d, [0.4, 0.4, 0.4, 1.0], 1.0);
        assert_eq!(gray, [0.4, 0.4, 0.4, 1.0]);
    }

    #[test]
    fn test_contrast_stage_validate() {
        let bad = ToneCurve {
            total: 2.0,
            ..Default::default()
        };
        assert!(StageOp::validate(&bad).is_err());
        assert!(StageOp::validate(&ToneCurve::default()).is_ok());
    }

    #[test]
    fn test_hue_correct_validate() {
        let mut adj = BandAdjuster::default();
        adj.band_mut(BandId::Teal).range = 0.0;
        match StageOp::validate(&adj).unwrap_err() {
            OpsError::InvalidParameter { stage, field, .. } => {
                assert_eq!(stage, "hue_correct");
                assert_eq!(field, "range");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
