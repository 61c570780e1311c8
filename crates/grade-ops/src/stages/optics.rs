//! Optical effects: glare, lens distortion and film grain.

use crate::parallel::{map_rgb_at, mix_images};
use crate::raster::{DispersionAxis, GlareMode};
use crate::stage::{StageContext, StageOp};
use crate::{OpsError, OpsResult};
use grade_color::tone_region::midtone_weight;
use grade_core::{CHANNELS, ImageBuf, luminance_rec709};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Tint multiplier of the halation pass (red-orange).
pub const HALATION_TINT: [f32; 3] = [1.0, 0.35, 0.1];

/// Size multiplier of the halation pass.
pub const HALATION_SIZE: f32 = 2.0;

/// Noise z offset per frame when grain is animated (golden-ratio step).
pub const GRAIN_FRAME_STEP: f32 = 0.618034;

/// Threshold glare with four components.
///
/// Every component with a positive intensity is generated by
/// [`RasterOps::glare`](crate::raster::RasterOps::glare), scaled and summed.
/// The sum is added to the image and to the run's glare output. Halation
/// is a bloom pass with a red-orange tint at twice the size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glare {
    /// Luminance where glare starts, `[0, 64]`.
    pub threshold: f32,
    /// Knee softness, `[0, 1]`.
    pub smoothness: f32,
    /// Glare size in pixels, `[0, 512]`.
    pub size: f32,
    /// Bloom intensity, `[0, 4]`.
    pub bloom: f32,
    /// Streak intensity, `[0, 4]`.
    pub streaks: f32,
    /// Ghost intensity, `[0, 4]`.
    pub ghosts: f32,
    /// Halation intensity, `[0, 4]`.
    pub halation: f32,
    /// Glare color, `[0, 4]` per channel.
    pub tint: [f32; 3],
}

impl Default for Glare {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            smoothness: 0.5,
            size: 32.0,
            bloom: 1.0,
            streaks: 0.0,
            ghosts: 0.0,
            halation: 0.0,
            tint: [1.0; 3],
        }
    }
}

impl Glare {
    /// `(mode, intensity, size, tint)` for each component.
    fn passes(&self) -> [(GlareMode, f32, f32, [f32; 3]); 4] {
        let t = self.tint;
        [
            (GlareMode::Bloom, self.bloom, self.size, t),
            (GlareMode::Streaks, self.streaks, self.size, t),
            (GlareMode::Ghosts, self.ghosts, self.size, t),
            (
                GlareMode::Bloom,
                self.halation,
                self.size * HALATION_SIZE,
                [t[0] * HALATION_TINT[0], t[1] * HALATION_TINT[1], t[2] * HALATION_TINT[2]],
            ),
        ]
    }
}

fn add_rgb(dst: &mut ImageBuf, src: &ImageBuf, k: f32) -> OpsResult<()> {
    dst.check_same_size(src)?;
    for (d, s) in dst.data_mut().chunks_exact_mut(CHANNELS).zip(src.data().chunks_exact(CHANNELS)) {
        for c in 0..3 {
            d[c] += s[c] * k;
        }
    }
    Ok(())
}

impl StageOp for Glare {
    const NAME: &'static str = "glare";
    const ENABLED_BY_DEFAULT: bool = false;

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "threshold", self.threshold, 0.0, 64.0)?;
        OpsError::check(Self::NAME, "smoothness", self.smoothness, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "size", self.size, 0.0, 512.0)?;
        OpsError::check(Self::NAME, "bloom", self.bloom, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "streaks", self.streaks, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "ghosts", self.ghosts, 0.0, 4.0)?;
        OpsError::check(Self::NAME, "halation", self.halation, 0.0, 4.0)?;
        for (v, c) in self.tint.into_iter().zip(["tint.r", "tint.g", "tint.b"]) {
            OpsError::check(Self::NAME, c, v, 0.0, 4.0)?;
        }
        Ok(())
    }

    fn is_identity(&self) -> bool {
        self.bloom == 0.0 && self.streaks == 0.0 && self.ghosts == 0.0 && self.halation == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let mut total = ImageBuf::new(img.width(), img.height());
        for (mode, intensity, size, tint) in self.passes() {
            if intensity <= 0.0 {
                continue;
            }
            ctx.cancel.check()?;
            trace!(?mode, intensity, size, "glare pass");
            let g = ctx.ops.glare(img, self.threshold, self.smoothness, size, tint, mode)?;
            add_rgb(&mut total, &g, intensity)?;
        }
        add_rgb(img, &total, blend)?;
        add_rgb(&mut ctx.glare, &total, blend)
    }
}

/// Radial lens distortion with chromatic dispersion.
///
/// Unlike the color stages this one moves alpha along with color, and the
/// blend mixes all four channels. Resampling runs on premultiplied color so
/// transparent texels do not bleed into their neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LensDistortion {
    /// Barrel (+) or pincushion (-), `[-1, 1]`.
    pub distortion: f32,
    /// Channel separation, `[-1, 1]`.
    pub dispersion: f32,
    /// Direction of the separation.
    pub axis: DispersionAxis,
}

impl StageOp for LensDistortion {
    const NAME: &'static str = "lens_distortion";
    const ENABLED_BY_DEFAULT: bool = false;

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "distortion", self.distortion, -1.0, 1.0)?;
        OpsError::check(Self::NAME, "dispersion", self.dispersion, -1.0, 1.0)
    }

    fn is_identity(&self) -> bool {
        self.distortion == 0.0 && self.dispersion == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let mode = img.alpha_mode();
        img.to_premultiplied();
        let out = ctx.ops.lens_distort(img, self.distortion, self.dispersion, self.axis)?;
        mix_images(img, &out, blend)?;
        img.convert_alpha(mode);
        Ok(())
    }
}

/// Multiplicative cellular grain, strongest in the midtones.
///
/// ```text
/// g   = 2 * noise(x / size, y / size, z) - 1
/// out = rgb * (1 + amount * g * (0.25 + 0.75 * midtone(L)))
/// ```
///
/// With `animate` the noise field moves by [`GRAIN_FRAME_STEP`] in z per
/// frame. `mono` uses one noise value for all channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilmGrain {
    /// `[0, 1]`.
    pub amount: f32,
    /// Grain size in pixels, `[0.1, 16]`.
    pub size: f32,
    /// Noise octaves, `[1, 8]`.
    pub detail: u32,
    /// Noise seed.
    pub seed: u32,
    /// Frame number.
    pub frame: u32,
    /// Move the grain with `frame`.
    pub animate: bool,
    /// Same grain in every channel.
    pub mono: bool,
}

impl Default for FilmGrain {
    fn default() -> Self {
        Self {
            amount: 0.25,
            size: 1.0,
            detail: 3,
            seed: 0,
            frame: 0,
            animate: false,
            mono: true,
        }
    }
}

impl StageOp for FilmGrain {
    const NAME: &'static str = "film_grain";
    const ENABLED_BY_DEFAULT: bool = false;

    fn validate(&self) -> OpsResult<()> {
        OpsError::check(Self::NAME, "amount", self.amount, 0.0, 1.0)?;
        OpsError::check(Self::NAME, "size", self.size, 0.1, 16.0)?;
        if !(1..=8).contains(&self.detail) {
            return Err(OpsError::invalid_parameter(
                Self::NAME,
                "detail",
                self.detail as f32,
                "[1, 8]",
            ));
        }
        Ok(())
    }

    fn is_identity(&self) -> bool {
        self.amount == 0.0
    }

    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()> {
        let ops = ctx.ops;
        let z = if self.animate {
            self.frame as f32 * GRAIN_FRAME_STEP
        } else {
            0.0
        };
        let inv = 1.0 / self.size.max(0.1);
        map_rgb_at(img, blend, ctx.cancel, |x, y, rgb| {
            let p = [x as f32 * inv, y as f32 * inv, z];
            let w = self.amount * (0.25 + 0.75 * midtone_weight(luminance_rec709(rgb), 0.5));
            let grain = |seed: u32| 2.0 * ops.cellular_noise(p, 1.0, self.detail, seed) - 1.0;
            if self.mono {
                let k = 1.0 + w * grain(self.seed);
                rgb.map(|v| v * k)
            } else {
                [
                    rgb[0] * (1.0 + w * grain(self.seed)),
                    rgb[1] * (1.0 + w * grain(self.seed.wrapping_add(1))),
                    rgb[2] * (1.0 + w * grain(self.seed.wrapping_add(2))),
                ]
            }
        })
    }
}
