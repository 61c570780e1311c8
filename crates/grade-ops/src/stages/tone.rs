//! Tonal stages: log tone map, user curves, value lift/gain and
//! lift/gamma/gain.

use crate::parallel::map_rgb;
use crate::raster::{CurveId, RasterOps};
use crate::stage::{StageContext, StageOp};
use crate::tone_curve::MIN_PIVOT;
use crate::{OpsError, OpsResult};
use grade_color::rgb_to_hsv;
use grade_color::tone_region::ToneRanges;
use grade_core::ImageBuf;
use serde::{Deserialize, Serialize};

/// HSV value below which [`Values`] adds instead of scaling.
const VALUE_EPSILON: f32 = 1e-6;

/// Log-space tone map through a curve.
///
/// Each positive channel is encoded as
/// `(log2(x / pivot) - min_ev) / (max_ev - min_ev)`, clamped to `[0, 1]`,
/// passed through the curve, then decoded with the inverse mapping.
/// Values outside `[min_ev, max_ev]` around the pivot are clipped to the
/// ends of that range. Non-positive values pass through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneMap {
    /// Curve evaluated on the encoded value.
    pub curve: CurveId,
    /// Stops below the pivot mapped to 0.
    pub min_ev: f32,
    /// Stops above the pivot mapped to 1.
    pub max_ev: f32,
    /// Scene-linear middle gray.
    pub pivot: f32,
}

impl Default for ToneMap {
    fn default() -> Self {
        Self {
            curve: CurveId::FILMIC,
            min_ev: -6.5,
            max_ev: 6.5,
            pivot: 0.18,
        }
    }
}

impl ToneMap {
    /// Maps one channel value.
    #[inline]
    pub fn map_value(&self, ops: &dyn RasterOps, x: f32) -> f32 {
        if x <= 0.0 {
            return x;
        }
        let pivot = self.pivot.max(MIN_PIVOT);
        let span = self.max_ev - self.min_ev;
        let t = ((x / pivot).log2() - self.min_ev) / span;
        let y = ops.eval_curve(self.curve, t.clamp(0.0, 1.0));
        pivot * (y * span + self.min_ev).exp2()
    }
}

impl StageOp for ToneMap {
    const NAME: &'static str = "tone_map";
    const ENABLED_BY_DEFAULT: bool = false;

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "min_ev", self.min_ev, -20.0, 0.0)?;
        OpsError::check(Self::NAME, "max_ev", self.max_ev, 0.0, 20.0)?;
        if self.max_ev - self.min_ev < 0.5 {
            return Err(OpsError::invalid_parameter(
                Self::NAME,
                "max_ev",
                self.max_ev,
                "at least 0.5 above min_ev",
            ));
        }
        OpsError::check(Self::NAME, "pivot", self.pivot, MIN_PIVOT, 16.0)
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let ops = ctx.ops;
        map_rgb(img, blend, ctx.cancel, |rgb| rgb.map(|v| self.map_value(ops, v)))
    }
}

/// Per-channel curves followed by a master curve.
///
/// Curves are evaluated on `[0, 1]`; whatever lies outside is carried over
/// unchanged, so `1.5` through a curve ending at `(1, 1)` stays `1.5`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Curves {
    /// Applied to all channels last.
    pub master: Option<CurveId>,
    /// Red channel.
    pub red: Option<CurveId>,
    /// Green channel.
    pub green: Option<CurveId>,
    /// Blue channel.
    pub blue: Option<CurveId>,
}

#[inline]
fn eval_extended(ops: &dyn RasterOps, curve: Option<CurveId>, x: f32) -> f32 {
    match curve {
        Some(id) => {
            let c = x.clamp(0.0, 1.0);
            ops.eval_curve(id, c) + (x - c)
        }
        None => x,
    }
}

impl StageOp for Curves {
    const NAME: &'static str = "curves";

    fn is_identity(&self) -> bool {
        [self.master, self.red, self.green, self.blue]
            .iter()
            .all(|c| matches!(c, None | Some(CurveId::IDENTITY)))
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let ops = ctx.ops;
        let channels = [self.red, self.green, self.blue];
        map_rgb(img, blend, ctx.cancel, |rgb| {
            let mut out = rgb;
            for (v, curve) in out.iter_mut().zip(channels) {
                *v = eval_extended(ops, self.master, eval_extended(ops, curve, *v));
            }
            out
        })
    }
}

/// Lifts shadows and scales highlights by HSV value.
///
/// ```text
/// v1 = v + shadows * 0.5 * shadow_mask * (1 - min(v, 1))
/// v2 = v1 * (1 + highlights * 0.5 * highlight_mask)
/// ```
///
/// The result is applied to RGB as the ratio `v2 / v`; for black pixels
/// the difference is added instead. Pixels with negative value pass through.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Values {
    /// Shadow lift, `[-1, 1]`.
    pub shadows: f32,
    /// Highlight gain, `[-1, 1]`.
    pub highlights: f32,
    /// Tone-region mask widths.
    pub ranges: ToneRanges,
}

impl Values {
    /// Maps one pixel.
    pub fn map(&self, rgb: [f32; 3]) -> [f32; 3] {
        let v = rgb_to_hsv(rgb).v;
        if v <= -VALUE_EPSILON {
            return rgb;
        }
        let m = self.ranges.masks(v);
        let lifted = v + self.shadows * 0.5 * m.shadow * (1.0 - v.min(1.0));
        let target = lifted * (1.0 + self.highlights * 0.5 * m.highlight);
        if v.abs() < VALUE_EPSILON {
            let d = target - v;
            rgb.map(|c| c + d)
        } else {
            let ratio = target / v;
            rgb.map(|c| c * ratio)
        }
    }
}

impl StageOp for Values {
    const NAME: &'static str = "values";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "shadows", self.shadows, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "highlights", self.highlights, -1.0, 1.0)?;
        self.ranges.validate().map_err(|e| OpsError::from_color(Self::NAME, e))
    }

    fn is_identity(&self) -> bool {
        self.shadows == 0.0 && self.highlights == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| self.map(rgb))
    }
}

/// Red, green, blue and master control.
///
/// Additive controls combine as `channel + master`, multiplicative ones as
/// `channel * master`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgbm {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// All channels.
    pub master: f32,
}

impl Rgbm {
    /// Same value everywhere.
    pub const fn uniform(v: f32) -> Self {
        Self {
            r: v,
            g: v,
            b: v,
            master: v,
        }
    }

    /// Returns a copy with a different master value.
    pub const fn with_master(mut self, master: f32) -> Self {
        self.master = master;
        self
    }

    /// Effective per-channel value for additive controls.
    #[inline]
    pub fn rgb_add(&self) -> [f32; 3] {
        [self.r + self.master, self.g + self.master, self.b + self.master]
    }

    /// Effective per-channel value for multiplicative controls.
    #[inline]
    pub fn rgb_mul(&self) -> [f32; 3] {
        [self.r * self.master, self.g * self.master, self.b * self.master]
    }

    fn as_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.master]
    }

    fn check(&self, field: &str, lo: f32, hi: f32) -> OpsResult<()> {
        for (v, c) in self.as_array().into_iter().zip(["r", "g", "b", "master"]) {
            OpsError::check(LiftGammaGain::NAME, &format!("{field}.{c}"), v, lo, hi)?;
        }
        Ok(())
    }
}

/// Extended CDL style lift, gamma and gain.
///
/// ```text
/// out = max(x * gain + lift * (1 - gain), 0) ^ (1 / gamma)
/// ```
///
/// Lift only acts where gain differs from 1: it sets the value black is
/// pulled toward as gain drops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftGammaGain {
    /// Additive, `[-1, 1]` per component.
    pub lift: Rgbm,
    /// Multiplicative, `[0.01, 10]` per component.
    pub gamma: Rgbm,
    /// Multiplicative, `[0, 10]` per component.
    pub gain: Rgbm,
}

impl Default for LiftGammaGain {
    fn default() -> Self {
        Self {
            lift: Rgbm::uniform(0.0),
            gamma: Rgbm::uniform(1.0),
            gain: Rgbm::uniform(1.0),
        }
    }
}

impl LiftGammaGain {
    /// Maps one pixel.
    #[inline]
    pub fn map(&self, rgb: [f32; 3]) -> [f32; 3] {
        let lift = self.lift.rgb_add();
        let gamma = self.gamma.rgb_mul();
        let gain = self.gain.rgb_mul();
        let mut out = [0.0; 3];
        for c in 0..3 {
            let x = (rgb[c] * gain[c] + lift[c] * (1.0 - gain[c])).max(0.0);
            out[c] = x.powf(1.0 / gamma[c].max(1e-3));
        }
        out
    }
}

impl StageOp for LiftGammaGain {
    const NAME: &'static str = "lift_gamma_gain";

    fn validate(&self) -> OpsResult<()> {
        self.lift.check("lift", -1.0, 1.0)?;
        self.gamma.check("gamma", 0.01, 10.0)?;
        self.gain.check("gain", 0.0, 10.0)
    }

    fn is_identity(&self) -> bool {
        self.lift.rgb_add() == [0.0; 3]
            && self.gamma.rgb_mul() == [1.0; 3]
            && self.gain.rgb_mul() == [1.0; 3]
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| self.map(rgb))
    }
}
