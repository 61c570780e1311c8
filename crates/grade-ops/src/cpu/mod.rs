//! CPU reference implementation of [`RasterOps`].
//!
//! - [`blur`] - separable Gaussian
//! - [`morph`] - square max/min with falloff
//! - [`warp`] - radial distortion with dispersion
//! - [`glare`] - bloom, streaks, ghosts
//! - [`noise`] - Worley F1 with octaves
//! - [`curve`] - monotone cubic curves
//! - [`display`] - Reinhard + sRGB
//!
//! With the `parallel` feature every row loop runs on the rayon pool.
//!
//! # Example
//!
//! ```rust
//! use grade_core::ImageBuf;
//! use grade_ops::{CpuRasterOps, CurveId, RasterOps};
//!
//! let mut ops = CpuRasterOps::new();
//! ops.register_curve(CurveId(2), &[[0.0, 0.0], [1.0, 0.5]]).unwrap();
//! assert!((ops.eval_curve(CurveId(2), 1.0) - 0.5).abs() < 1e-6);
//!
//! let img = ImageBuf::filled(8, 8, [1.0, 1.0, 1.0, 1.0]);
//! let blurred = ops.blur(&img, 2.0).unwrap();
//! assert!((blurred.pixel(3, 3)[0] - 1.0).abs() < 1e-5);
//! ```

pub mod blur;
pub mod curve;
pub mod display;
pub mod glare;
pub mod morph;
pub mod noise;
pub mod warp;

pub use curve::{CurveDef, MonotoneCurve};

use crate::raster::{CurveId, DispersionAxis, GlareMode, RasterOps};
use crate::{OpsError, OpsResult};
use grade_core::ImageBuf;
use std::collections::HashMap;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `f(row_index, row)` over fixed-length rows of `dst`.
pub(crate) fn for_each_row<F>(dst: &mut [f32], row_len: usize, f: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    #[cfg(feature = "parallel")]
    dst.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| f(y, row));
    #[cfg(not(feature = "parallel"))]
    dst.chunks_mut(row_len).enumerate().for_each(|(y, row)| f(y, row));
}

/// CPU raster primitives with a curve registry.
#[derive(Debug, Clone)]
pub struct CpuRasterOps {
    curves: HashMap<CurveId, MonotoneCurve>,
}

impl Default for CpuRasterOps {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRasterOps {
    /// Creates the primitives with the built-in curves registered.
    pub fn new() -> Self {
        let mut curves = HashMap::new();
        curves.insert(CurveId::IDENTITY, MonotoneCurve::identity());
        if let Ok(filmic) = MonotoneCurve::new(&curve::FILMIC_POINTS) {
            curves.insert(CurveId::FILMIC, filmic);
        }
        Self { curves }
    }

    /// Creates the primitives and registers every definition.
    pub fn with_curves(defs: &[CurveDef]) -> OpsResult<Self> {
        let mut ops = Self::new();
        for def in defs {
            ops.register_curve(def.id, &def.points)?;
        }
        Ok(ops)
    }

    /// Registers (or replaces) a user curve.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidCurve`] for a reserved id or malformed points.
    pub fn register_curve(&mut self, id: CurveId, points: &[[f32; 2]]) -> OpsResult<()> {
        if id.0 < CurveId::FIRST_USER {
            return Err(OpsError::InvalidCurve {
                id: id.0,
                reason: format!("ids below {} are reserved", CurveId::FIRST_USER),
            });
        }
        let curve =
            MonotoneCurve::new(points).map_err(|reason| OpsError::InvalidCurve { id: id.0, reason })?;
        self.curves.insert(id, curve);
        Ok(())
    }

    /// Returns true if `id` is registered.
    pub fn has_curve(&self, id: CurveId) -> bool {
        self.curves.contains_key(&id)
    }
}

fn from_vec(like: &ImageBuf, data: Vec<f32>) -> OpsResult<ImageBuf> {
    Ok(ImageBuf::from_data(like.width(), like.height(), data)?.with_alpha_mode(like.alpha_mode()))
}

fn dims(image: &ImageBuf) -> (usize, usize) {
    (image.width() as usize, image.height() as usize)
}

impl RasterOps for CpuRasterOps {
    fn blur(&self, image: &ImageBuf, radius: f32) -> OpsResult<ImageBuf> {
        let (w, h) = dims(image);
        trace!(radius, w, h, "cpu blur");
        from_vec(image, blur::gaussian_blur(image.data(), w, h, radius))
    }

    fn dilate_erode(&self, mask: &ImageBuf, size: f32, falloff: f32) -> OpsResult<ImageBuf> {
        let (w, h) = dims(mask);
        trace!(size, falloff, "cpu dilate/erode");
        from_vec(mask, morph::dilate_erode(mask.data(), w, h, size, falloff))
    }

    fn lens_distort(
        &self,
        image: &ImageBuf,
        amount: f32,
        dispersion: f32,
        axis: DispersionAxis,
    ) -> OpsResult<ImageBuf> {
        let (w, h) = dims(image);
        trace!(amount, dispersion, ?axis, "cpu lens distort");
        from_vec(image, warp::lens_distort(image.data(), w, h, amount, dispersion, axis))
    }

    fn glare(
        &self,
        image: &ImageBuf,
        threshold: f32,
        smoothness: f32,
        size: f32,
        tint: [f32; 3],
        mode: GlareMode,
    ) -> OpsResult<ImageBuf> {
        let (w, h) = dims(image);
        trace!(threshold, size, ?mode, "cpu glare");
        if image.is_empty() {
            return Ok(ImageBuf::new(image.width(), image.height()));
        }
        from_vec(
            image,
            glare::glare(image.data(), w, h, threshold, smoothness, size, tint, mode),
        )
    }

    fn cellular_noise(&self, coord: [f32; 3], scale: f32, detail: u32, seed: u32) -> f32 {
        noise::cellular_noise(coord, scale, detail, seed)
    }

    fn eval_curve(&self, curve: CurveId, x: f32) -> f32 {
        match self.curves.get(&curve) {
            Some(c) => c.eval(x),
            None => x,
        }
    }

    fn display_transform(&self, rgb: [f32; 3]) -> [f32; 3] {
        display::display_transform(rgb)
    }
}
