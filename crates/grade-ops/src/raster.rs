//! Raster primitives the grading stages call into.
//!
//! The grading math in this crate is per-pixel; anything that looks at
//! neighbouring pixels, evaluates a user curve or draws noise goes through
//! [`RasterOps`]. A host with its own blur, glare or curve machinery
//! implements the trait; [`crate::cpu::CpuRasterOps`] is the reference
//! implementation.

use crate::OpsResult;
use grade_core::ImageBuf;
use serde::{Deserialize, Serialize};

/// Handle of a curve known to a [`RasterOps`] implementation.
///
/// [`CurveId::IDENTITY`] always evaluates to `x`. [`CurveId::FILMIC`] is a
/// built-in S-curve for log-encoded input. User curves use ids from
/// [`CurveId::FIRST_USER`] on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveId(pub u32);

impl CurveId {
    /// Straight line `y = x`.
    pub const IDENTITY: CurveId = CurveId(0);
    /// Built-in filmic S-curve on `[0, 1]`.
    pub const FILMIC: CurveId = CurveId(1);
    /// Smallest id available for user curves.
    pub const FIRST_USER: u32 = 2;
}

impl Default for CurveId {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which glare pattern to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlareMode {
    /// Soft round bloom around bright areas.
    Bloom,
    /// Horizontal and vertical star streaks.
    Streaks,
    /// Mirrored lens ghosts.
    Ghosts,
}

/// Direction along which chromatic dispersion separates channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispersionAxis {
    /// Channels separate along the radius (classic lateral CA).
    #[default]
    Radial,
    /// Channels separate horizontally only (anamorphic look).
    Horizontal,
}

/// Spatial and lookup primitives used by the grading stages.
///
/// Image arguments are straight-alpha RGBA. Implementations must be total:
/// finite input never produces an error other than a dimension problem.
pub trait RasterOps: Send + Sync {
    /// Gaussian-like blur. `radius` is in pixels; `0` returns a copy.
    fn blur(&self, image: &ImageBuf, radius: f32) -> OpsResult<ImageBuf>;

    /// Grows (`size > 0`) or shrinks (`size < 0`) bright regions of a mask,
    /// then softens the result over `falloff` pixels.
    fn dilate_erode(&self, mask: &ImageBuf, size: f32, falloff: f32) -> OpsResult<ImageBuf>;

    /// Radial lens distortion with chromatic dispersion.
    ///
    /// `amount > 0` is barrel, `< 0` pincushion.
    fn lens_distort(
        &self,
        image: &ImageBuf,
        amount: f32,
        dispersion: f32,
        axis: DispersionAxis,
    ) -> OpsResult<ImageBuf>;

    /// Returns the isolated glare contribution of `image` (not the image
    /// plus glare). Alpha of the result is 0.
    fn glare(
        &self,
        image: &ImageBuf,
        threshold: f32,
        smoothness: f32,
        size: f32,
        tint: [f32; 3],
        mode: GlareMode,
    ) -> OpsResult<ImageBuf>;

    /// Cellular (Worley F1) noise in `[0, 1]` at `coord * scale`, summed over
    /// `detail` octaves.
    fn cellular_noise(&self, coord: [f32; 3], scale: f32, detail: u32, seed: u32) -> f32;

    /// Evaluates a curve. Unknown ids evaluate as identity.
    fn eval_curve(&self, curve: CurveId, x: f32) -> f32;

    /// Maps scene-linear RGB to display-referred `[0, 1]`.
    fn display_transform(&self, rgb: [f32; 3]) -> [f32; 3];
}
