//! Tinting stages: tone-region color blending and split toning.

use crate::parallel::map_rgb;
use crate::stage::{StageContext, StageOp};
use crate::{OpsError, OpsResult};
use grade_color::blend::{mix3, soft_light};
use grade_color::hsv::{Hsv, hsv_to_rgb, rgb_to_hsv};
use grade_color::tone_region::ToneRanges;
use grade_core::{ImageBuf, luminance_rec709};
use grade_math::{saturate, smoothstep};
use serde::{Deserialize, Serialize};

/// Neutral soft-light tint.
const NEUTRAL: [f32; 3] = [0.5; 3];

/// Soft light on the `[0, 1]` part of `base`; anything above 1 is kept.
#[inline]
fn soft_light_hdr(base: [f32; 3], tint: [f32; 3]) -> [f32; 3] {
    let mut out = [0.0; 3];
    for c in 0..3 {
        let b = base[c];
        if b < 0.0 {
            out[c] = b;
            continue;
        }
        let low = b.min(1.0);
        out[c] = soft_light(low, tint[c]) + (b - low);
    }
    out
}

fn check_color(stage: &str, field: &str, rgb: [f32; 3]) -> OpsResult<()> {
    for (v, c) in rgb.into_iter().zip(["r", "g", "b"]) {
        OpsError::check(stage, &format!("{field}.{c}"), v, 0.0, 1.0)?;
    }
    Ok(())
}

/// Soft-light color overlay per tone region.
///
/// Each region's color is soft-lit over the pixel and mixed in by
/// `strength * mask`, with masks from the pixel's HSV value. A color of
/// `0.5` gray is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorBlending {
    /// Shadow tint, `[0, 1]` per channel.
    pub shadow_color: [f32; 3],
    /// `[0, 1]`.
    pub shadow_strength: f32,
    /// Midtone tint.
    pub midtone_color: [f32; 3],
    /// `[0, 1]`.
    pub midtone_strength: f32,
    /// Highlight tint.
    pub highlight_color: [f32; 3],
    /// `[0, 1]`.
    pub highlight_strength: f32,
    /// Tone-region mask widths.
    pub ranges: ToneRanges,
}

impl Default for ColorBlending {
    fn default() -> Self {
        Self {
            shadow_color: NEUTRAL,
            shadow_strength: 0.0,
            midtone_color: NEUTRAL,
            midtone_strength: 0.0,
            highlight_color: NEUTRAL,
            highlight_strength: 0.0,
            ranges: ToneRanges::default(),
        }
    }
}

impl ColorBlending {
    /// Maps one pixel.
    pub fn map(&self, rgb: [f32; 3]) -> [f32; 3] {
        let m = self.ranges.masks(rgb_to_hsv(rgb).v);
        let mut out = rgb;
        for (color, weight) in [
            (self.shadow_color, self.shadow_strength * m.shadow),
            (self.midtone_color, self.midtone_strength * m.midtone),
            (self.highlight_color, self.highlight_strength * m.highlight),
        ] {
            if weight > 0.0 {
                out = mix3(out, soft_light_hdr(out, color), weight);
            }
        }
        out
    }
}

impl StageOp for ColorBlending {
    const NAME: &'static str = "color_blending";

    fn validate(&self) -> OpsResult<()> {
        check_color(Self::NAME, "shadow_color", self.shadow_color)?;
        check_color(Self::NAME, "midtone_color", self.midtone_color)?;
        check_color(Self::NAME, "highlight_color", self.highlight_color)?;
        OpsError::check(Self::NAME, "shadow_strength", self.shadow_strength, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "midtone_strength", self.midtone_strength, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "highlight_strength", self.highlight_strength, 0.0, 1.0)?;
        self.ranges.validate().map_err(|e| OpsError::from_color(Self::NAME, e))
    }

    fn is_identity(&self) -> bool {
        self.shadow_strength == 0.0 && self.midtone_strength == 0.0 && self.highlight_strength == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| self.map(rgb))
    }
}

/// Split toning: one tint for shadows, another for highlights.
///
/// Tint colors are `mix(0.5, hue at full saturation, saturation)` and are
/// soft-lit over the pixel. The split point is
/// `p = saturate(0.5 + 0.5 * balance)` in luminance, with a crossfade of
/// ±0.25 around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitTone {
    /// Shadow hue in turns.
    pub shadow_hue: f32,
    /// `[0, 1]`.
    pub shadow_saturation: f32,
    /// Highlight hue in turns.
    pub highlight_hue: f32,
    /// `[0, 1]`.
    pub highlight_saturation: f32,
    /// Moves the split point up (+) or down (-), `[-1, 1]`.
    pub balance: f32,
}

impl Default for SplitTone {
    fn default() -> Self {
        Self {
            shadow_hue: 0.58,
            shadow_saturation: 0.0,
            highlight_hue: 0.08,
            highlight_saturation: 0.0,
            balance: 0.0,
        }
    }
}

/// Soft-light tint for a hue at a saturation.
pub fn tint_color(hue: f32, saturation: f32) -> [f32; 3] {
    mix3(NEUTRAL, hsv_to_rgb(Hsv::new(hue, 1.0, 1.0)), saturation)
}

impl SplitTone {
    /// Highlight weight at luminance `l`.
    pub fn highlight_weight(&self, l: f32) -> f32 {
        let p = saturate(0.5 + 0.5 * self.balance);
        smoothstep(p - 0.25, p + 0.25, l)
    }

    /// Maps one pixel.
    pub fn map(&self, rgb: [f32; 3]) -> [f32; 3] {
        let shadow = soft_light_hdr(rgb, tint_color(self.shadow_hue, self.shadow_saturation));
        let highlight = soft_light_hdr(rgb, tint_color(self.highlight_hue, self.highlight_saturation));
        mix3(shadow, highlight, self.highlight_weight(luminance_rec709(rgb)))
    }
}

impl StageOp for SplitTone {
    const NAME: &'static str = "split_tone";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "shadow_hue", self.shadow_hue, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "shadow_saturation", self.shadow_saturation, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "highlight_hue", self.highlight_hue, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "highlight_saturation", self.highlight_saturation, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "balance", self.balance, -1.0, 1.0)
    }

    fn is_identity(&self) -> bool {
        self.shadow_saturation == 0.0 && self.highlight_saturation == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        map_rgb(img, blend, ctx.cancel, |rgb| self.map(rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_util::apply_op;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_soft_light_hdr_keeps_excess() {
        let out = soft_light_hdr([2.0, 0.5, -0.1], [0.5, 0.5, 1.0]);
        assert_abs_diff_eq!(out[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.5, epsilon = 1e-6);
        assert_eq!(out[2], -0.1);
    }

    #[test]
    fn test_neutral_color_is_noop() {
        let cb = ColorBlending {
            shadow_strength: 1.0,
            ..Default::default()
        };
        let px = [0.1, 0.2, 0.05];
        let out = cb.map(px);
        for c in 0..3 {
            assert_abs_diff_eq!(out[c], px[c], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_shadow_tint_only_in_shadows() {
        let cb = ColorBlending {
            shadow_color: [0.0, 0.0, 1.0],
            shadow_strength: 1.0,
            ..Default::default()
        };
        let dark = apply_op(&cb, [0.1, 0.1, 0.1, 1.0], 1.0);
        assert!(dark[2] > dark[0]);
        let bright = apply_op(&cb, [0.9, 0.9, 0.9, 1.0], 1.0);
        assert_eq!(bright, [0.9, 0.9, 0.9, 1.0]);
    }

    #[test]
    fn test_color_blending_validate() {
        let cb = ColorBlending {
            highlight_color: [1.5, 0.0, 0.0],
            ..Default::default()
        };
        match cb.validate().unwrap_err() {
            OpsError::InvalidParameter { field, .. } => assert_eq!(field, "highlight_color.r"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_split_tone() {
        let st = SplitTone {
            shadow_hue: 0.67,
            shadow_saturation: 1.0,
            highlight_hue: 0.08,
            highlight_saturation: 1.0,
            balance: 0.0,
        };
        let dark = st.map([0.05, 0.05, 0.05]);
        assert!(dark[2] > dark[0]);
        let bright = st.map([0.9, 0.9, 0.9]);
        assert!(bright[0] > bright[2]);
    }

    #[test]
    fn test_split_tone_balance() {
        let up = SplitTone {
            balance: 1.0,
            ..Default::default()
        };
        let down = SplitTone {
            balance: -1.0,
            ..Default::default()
        };
        assert!(up.highlight_weight(0.6) < down.highlight_weight(0.6));
        assert_eq!(down.highlight_weight(0.3), 1.0);
    }
}
