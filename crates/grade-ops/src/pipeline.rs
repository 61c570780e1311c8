//! The two-phase grading pipeline.
//!
//! ```text
//! input ──sanitize──> straight alpha
//!   │
//!   ├─ pre:  color_boost → white_balance → exposure → contrast → glare
//!   │        → tone_map → hue_correct                     mix by factor
//!   │
//!   ├─ post: texture → sharpness → clarity → curves → color_blending
//!   │        → values → saturation → value_saturation → hue_correct
//!   │        → density → lift_gamma_gain → split_tone → lens_distortion
//!   │        → film_grain                                 mix by factor
//!   │
//!   └─ back to the input alpha mode ──> GradeOutput { image, glare }
//! ```
//!
//! Each phase result is mixed with that phase's input by `factor`, so
//! `factor = 0` returns the input unchanged and `factor = 1` the full grade.
//!
//! # Example
//!
//! ```rust
//! use grade_core::ImageBuf;
//! use grade_ops::{CompositePipeline, GradeParams};
//!
//! let mut params = GradeParams::default();
//! params.pre.exposure.params.stops = 1.0;
//!
//! let pipeline = CompositePipeline::new(params).unwrap();
//! let img = ImageBuf::filled(4, 4, [0.25, 0.25, 0.25, 1.0]);
//! let out = pipeline.process(&img, 1.0).unwrap();
//! assert!((out.image.pixel(0, 0)[0] - 0.5).abs() < 1e-6);
//! ```

use crate::cpu::CpuRasterOps;
use crate::params::{GradeParams, for_each_post, for_each_pre};
use crate::parallel::{CancelToken, mix_images};
use crate::raster::RasterOps;
use crate::stage::StageContext;
use crate::{OpsError, OpsResult};
use grade_core::{AlphaMode, ImageBuf, NonFinitePolicy, Rgba};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a grading run.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutput {
    /// Graded image, in the alpha mode of the input.
    pub image: ImageBuf,
    /// Glare contribution added by the glare stage (straight, alpha 0).
    /// All zero when glare is disabled.
    pub glare: ImageBuf,
}

/// Grading pipeline bound to a parameter set and a [`RasterOps`]
/// implementation.
pub struct CompositePipeline {
    params: GradeParams,
    ops: Arc<dyn RasterOps>,
    policy: NonFinitePolicy,
    cancel: CancelToken,
}

impl std::fmt::Debug for CompositePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositePipeline")
            .field("params", &self.params)
            .field("policy", &self.policy)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl CompositePipeline {
    /// Validates `params` and builds a pipeline on [`CpuRasterOps`] with the
    /// parameter set's curves registered.
    pub fn new(params: GradeParams) -> OpsResult<Self> {
        params.validate()?;
        let ops = CpuRasterOps::with_curves(&params.curves)?;
        Ok(Self::build(params, Arc::new(ops)))
    }

    /// Validates `params` and builds a pipeline on a caller-supplied
    /// [`RasterOps`]. Curves in `params` are not registered anywhere; the
    /// implementation is expected to know them.
    pub fn with_ops(params: GradeParams, ops: Arc<dyn RasterOps>) -> OpsResult<Self> {
        params.validate()?;
        Ok(Self::build(params, ops))
    }

    fn build(params: GradeParams, ops: Arc<dyn RasterOps>) -> Self {
        debug!(
            pre = ?params.pre.active_stages(),
            post = ?params.post.active_stages(),
            "pipeline created"
        );
        Self {
            params,
            ops,
            policy: NonFinitePolicy::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Sets the handling of NaN and infinite input.
    pub fn with_non_finite_policy(mut self, policy: NonFinitePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current parameters.
    pub fn params(&self) -> &GradeParams {
        &self.params
    }

    /// Replaces the parameters after validating them. On error the old
    /// parameters stay in place.
    ///
    /// When the pipeline was built by [`CompositePipeline::new`], the new
    /// curve set replaces the registered one.
    pub fn set_params(&mut self, params: GradeParams) -> OpsResult<()> {
        params.validate()?;
        if params.curves != self.params.curves {
            self.ops = Arc::new(CpuRasterOps::with_curves(&params.curves)?);
        }
        self.params = params;
        Ok(())
    }

    /// Edits the parameters in place, keeping the edit only if the result
    /// validates.
    pub fn update<F>(&mut self, edit: F) -> OpsResult<()>
    where
        F: FnOnce(&mut GradeParams),
    {
        let mut params = self.params.clone();
        edit(&mut params);
        self.set_params(params)
    }

    /// Token that cancels runs of this pipeline. Clones share the flag.
    ///
    /// The flag is sticky: once cancelled, every later [`process`](Self::process)
    /// returns [`OpsError::Cancelled`] until [`CancelToken::reset`] is called.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Grades an image.
    ///
    /// # Errors
    ///
    /// - [`OpsError::InvalidParameter`] if `factor` is outside `[0, 1]`
    /// - [`OpsError::Cancelled`] if the cancel token fires or is still set
    ///   from an earlier cancellation
    /// - errors from the [`RasterOps`] implementation
    pub fn process(&self, input: &ImageBuf, factor: f32) -> OpsResult<GradeOutput> {
        OpsError::check("pipeline", "factor", factor, 0.0, 1.0)?;
        let (width, height) = input.dimensions();
        debug!(width, height, factor, "grading");

        let mode = input.alpha_mode();
        let mut img = input.clone();
        let fixed = img.sanitize(self.policy);
        if fixed > 0 {
            warn!(pixels = fixed, "replaced non-finite input values");
        }
        img.to_straight();

        let mut ctx = StageContext::new(self.ops.as_ref(), &self.cancel, width, height);

        if factor > 0.0 {
            let before = img.clone();
            let mut ran = 0usize;
            for_each_pre!(&self.params.pre, s => if s.run(&mut img, &mut ctx)? { ran += 1 });
            debug!(stages = ran, "pre phase done");
            if ran > 0 {
                blend_phase(&mut img, before, factor)?;
            }

            let before = img.clone();
            let mut ran = 0usize;
            for_each_post!(&self.params.post, s => if s.run(&mut img, &mut ctx)? { ran += 1 });
            debug!(stages = ran, "post phase done");
            if ran > 0 {
                blend_phase(&mut img, before, factor)?;
            }
        }
        self.cancel.check()?;

        let mut glare = ctx.glare;
        if factor < 1.0 {
            glare.map_pixels(|px| [px[0] * factor, px[1] * factor, px[2] * factor, px[3]]);
        }

        img.convert_alpha(mode);
        Ok(GradeOutput { image: img, glare })
    }

    /// Grades a single straight-alpha pixel.
    pub fn process_pixel(&self, px: Rgba, factor: f32) -> OpsResult<Rgba> {
        let img = ImageBuf::filled(1, 1, px).with_alpha_mode(AlphaMode::Straight);
        Ok(self.process(&img, factor)?.image.pixel(0, 0))
    }
}

/// `img = mix(before, img, factor)`.
fn blend_phase(img: &mut ImageBuf, mut before: ImageBuf, factor: f32) -> OpsResult<()> {
    if factor >= 1.0 {
        return Ok(());
    }
    mix_images(&mut before, img, factor)?;
    *img = before;
    Ok(())
}
