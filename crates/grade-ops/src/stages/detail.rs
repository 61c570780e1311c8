//! Spatial detail stages: texture, sharpness and clarity.
//!
//! All three compare the image with a blurred copy obtained from
//! [`RasterOps::blur`](crate::raster::RasterOps::blur) and feed the
//! difference back.

use crate::parallel::map_rgb_with;
use crate::raster::RasterOps;
use crate::stage::{StageContext, StageOp};
use crate::{OpsError, OpsResult};
use grade_color::tone_region::midtone_weight;
use grade_core::{CHANNELS, ImageBuf, luminance_rec709};
use grade_math::smoothstep;
use serde::{Deserialize, Serialize};

/// Luminance below which ratio-based stages leave a pixel alone.
const MIN_LUMINANCE: f32 = 1e-6;

/// Midtone range of the clarity weight.
pub const CLARITY_MIDTONE_RANGE: f32 = 0.5;

#[inline]
fn scale_to(rgb: [f32; 3], from: f32, to: f32) -> [f32; 3] {
    if from <= MIN_LUMINANCE {
        return rgb;
    }
    let ratio = to.max(0.0) / from;
    rgb.map(|v| v * ratio)
}

/// Fine luminance micro-contrast.
///
/// `L' = L + amount * (L - blur(L, radius))`, applied to RGB as the ratio
/// `L' / L`. With `display_space` the luminance is measured after the
/// display transform, which weights shadow texture the way it is seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texture {
    /// `[-1, 1]`; negative smooths.
    pub amount: f32,
    /// Blur radius in pixels, `[0.5, 64]`.
    pub radius: f32,
    /// Measure luminance on display-referred values.
    pub display_space: bool,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            amount: 0.0,
            radius: 4.0,
            display_space: false,
        }
    }
}

impl Texture {
    #[inline]
    fn measure(&self, ops: &dyn RasterOps, rgb: [f32; 3]) -> f32 {
        if self.display_space {
            luminance_rec709(ops.display_transform(rgb))
        } else {
            luminance_rec709(rgb)
        }
    }
}

impl StageOp for Texture {
    const NAME: &'static str = "texture";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "amount", self.amount, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "radius", self.radius, 0.5, 64.0)
    }

    fn is_identity(&self) -> bool {
        self.amount == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let ops = ctx.ops;
        let mut plane = img.clone();
        plane.map_pixels(|px| {
            let l = self.measure(ops, [px[0], px[1], px[2]]);
            [l, l, l, 1.0]
        });
        let blurred = ops.blur(&plane, self.radius)?;
        map_rgb_with(img, &blurred, blend, ctx.cancel, |rgb, g| {
            let l = self.measure(ops, rgb);
            scale_to(rgb, l, l + self.amount * (l - g[0]))
        })
    }
}

/// Unsharp mask with halo suppression.
///
/// `out = rgb + amount * (rgb - blur(rgb)) * keep`, where `keep` falls to 0
/// wherever the luminance detail, grown by `halo_size` pixels, exceeds
/// `halo_threshold`. A threshold of 0 turns suppression off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sharpness {
    /// `[0, 4]`.
    pub amount: f32,
    /// Blur radius in pixels, `[0.5, 16]`.
    pub radius: f32,
    /// Detail magnitude treated as an edge, `[0, 1]`.
    pub halo_threshold: f32,
    /// Growth of the edge mask in pixels, `[0, 16]`.
    pub halo_size: f32,
}

impl Default for Sharpness {
    fn default() -> Self {
        Self {
            amount: 0.0,
            radius: 1.0,
            halo_threshold: 0.1,
            halo_size: 2.0,
        }
    }
}

impl StageOp for Sharpness {
    const NAME: &'static str = "sharpness";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "amount", self.amount, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "radius", self.radius, 0.5, 16.0)?;
        OpsError::check(Self::NAME, "halo_threshold", self.halo_threshold, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "halo_size", self.halo_size, 0.0, 16.0)
    }

    fn is_identity(&self) -> bool {
        self.amount == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let ops = ctx.ops;
        // Blurred color in RGB, edge keep-weight in alpha.
        let mut guide = ops.blur(img, self.radius)?;
        img.check_same_size(&guide)?;

        if self.halo_threshold > 0.0 {
            let mut edges = Vec::with_capacity(img.data().len());
            for (p, b) in img.data().chunks_exact(CHANNELS).zip(guide.data().chunks_exact(CHANNELS)) {
                let d = (luminance_rec709([p[0], p[1], p[2]]) - luminance_rec709([b[0], b[1], b[2]])).abs();
                edges.extend_from_slice(&[d, d, d, 1.0]);
            }
            let edges = ImageBuf::from_data(img.width(), img.height(), edges)?;
            ctx.cancel.check()?;
            let grown = ops.dilate_erode(&edges, self.halo_size, self.halo_size * 0.5)?;
            guide.check_same_size(&grown)?;
            let t = self.halo_threshold;
            for (g, m) in guide.data_mut().chunks_exact_mut(CHANNELS).zip(grown.data().chunks_exact(CHANNELS)) {
                g[3] = 1.0 - smoothstep(t * 0.5, t, m[0]);
            }
        } else {
            for g in guide.data_mut().chunks_exact_mut(CHANNELS) {
                g[3] = 1.0;
            }
        }

        map_rgb_with(img, &guide, blend, ctx.cancel, |rgb, g| {
            let k = self.amount * g[3];
            [
                rgb[0] + (rgb[0] - g[0]) * k,
                rgb[1] + (rgb[1] - g[1]) * k,
                rgb[2] + (rgb[2] - g[2]) * k,
            ]
        })
    }
}

/// Large-radius local contrast, concentrated in the midtones.
///
/// `delta = amount * (L - blur(L, radius)) * midtone(L)`. With
/// `preserve_color` the luminance change is applied as a ratio, otherwise
/// `delta` is added to every channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clarity {
    /// `[-1, 1]`.
    pub amount: f32,
    /// Blur radius in pixels, `[1, 256]`.
    pub radius: f32,
    /// Keep hue and saturation.
    pub preserve_color: bool,
}

impl Default for Clarity {
    fn default() -> Self {
        Self {
            amount: 0.0,
            radius: 16.0,
            preserve_color: true,
        }
    }
}

impl StageOp for Clarity {
    const NAME: &'static str = "clarity";

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "amount", self.amount, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "radius", self.radius, 1.0, 256.0)
    }

    fn is_identity(&self) -> bool {
        self.amount == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let blurred = ctx.ops.blur(&img.luminance_image(), self.radius)?;
        map_rgb_with(img, &blurred, blend, ctx.cancel, |rgb, g| {
            let l = luminance_rec709(rgb);
            let delta = self.amount * (l - g[0]) * midtone_weight(l, CLARITY_MIDTONE_RANGE);
            if self.preserve_color {
                scale_to(rgb, l, l + delta)
            } else {
                rgb.map(|v| v + delta)
            }
        })
    }
}
