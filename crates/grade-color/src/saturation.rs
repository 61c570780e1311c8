//! Saturation in HSV and opponent space.
//!
//! [`saturate`] scales saturation two ways and mixes them:
//!
//! - HSV: `S *= factor`.
//! - Opponent: `chroma *= 1 + (factor - 1) * (0.5 + 0.5 * midtone(L))`, so
//!   midtones respond fully while deep shadows and bright highlights get
//!   half the change.
//!
//! [`color_boost`] picks the factor per pixel from the pixel's existing
//! saturation (vibrance).

use crate::hsv::{hsv_to_rgb, rgb_to_hsv};
use crate::opponent::{from_opponent, to_opponent};
use crate::tone_region::midtone_weight;

/// Midtone range used by the opponent saturation curve.
pub const SATURATION_MIDTONE_RANGE: f32 = 0.5;

/// Scales saturation by `factor`, mixing the HSV (`perceptual = 0`) and
/// opponent (`perceptual = 1`) renditions.
///
/// `factor == 1` returns the input unchanged.
///
/// ```rust
/// use grade_color::saturation::saturate;
///
/// let gray = [0.18, 0.18, 0.18];
/// assert_eq!(saturate(gray, 0.0, 0.0), gray);
/// ```
pub fn saturate(rgb: [f32; 3], factor: f32, perceptual: f32) -> [f32; 3] {
    if factor == 1.0 {
        return rgb;
    }
    let t = perceptual.clamp(0.0, 1.0);
    if t <= 0.0 {
        return saturate_hsv(rgb, factor);
    }
    if t >= 1.0 {
        return saturate_opponent(rgb, factor);
    }
    let a = saturate_hsv(rgb, factor);
    let b = saturate_opponent(rgb, factor);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// HSV saturation scale.
#[inline]
pub fn saturate_hsv(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    let mut hsv = rgb_to_hsv(rgb);
    if hsv.s == 0.0 {
        return rgb;
    }
    hsv.s *= factor.max(0.0);
    hsv_to_rgb(hsv)
}

/// Opponent chroma scale weighted toward midtones.
#[inline]
pub fn saturate_opponent(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    let mut lab = to_opponent(rgb);
    let curve = 0.5 + 0.5 * midtone_weight(lab.l, SATURATION_MIDTONE_RANGE);
    let scale = (1.0 + (factor - 1.0) * curve).max(0.0);
    lab.a *= scale;
    lab.b *= scale;
    from_opponent(lab)
}

/// Saturation multiplier for [`color_boost`].
///
/// `strength >= 0` lifts muted colors most: `1 + 3 * strength * (1 - s)^2`.
/// `strength < 0` mutes saturated colors most: `1 + strength * (0.25 + 0.75 * s)`.
#[inline]
pub fn boost_multiplier(saturation: f32, strength: f32) -> f32 {
    let s = saturation.clamp(0.0, 1.0);
    let strength = strength.clamp(-1.0, 1.0);
    if strength >= 0.0 {
        let inv = 1.0 - s;
        1.0 + 3.0 * strength * inv * inv
    } else {
        1.0 + strength * (0.25 + 0.75 * s)
    }
}

/// Content-adaptive saturation (vibrance).
pub fn color_boost(rgb: [f32; 3], strength: f32, perceptual: f32) -> [f32; 3] {
    if strength == 0.0 {
        return rgb;
    }
    let s = rgb_to_hsv(rgb).s;
    saturate(rgb, boost_multiplier(s, strength), perceptual)
}
