//! The stage abstraction shared by every grading step.
//!
//! A stage is a parameter struct implementing [`StageOp`], wrapped in a
//! [`Stage`] that adds the `enabled` switch and the `blend` amount. In a
//! parameter file the wrapper fields sit next to the stage's own fields:
//!
//! ```yaml
//! exposure:
//!   enabled: true
//!   blend: 0.5
//!   stops: 1.0
//! ```

use crate::parallel::CancelToken;
use crate::raster::RasterOps;
use crate::{OpsError, OpsResult};
use grade_core::ImageBuf;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Per-run state handed to every stage.
pub struct StageContext<'a> {
    /// Spatial and lookup primitives.
    pub ops: &'a dyn RasterOps,
    /// Polled between stages and per row band.
    pub cancel: &'a CancelToken,
    /// Accumulated glare contribution, same size as the image.
    pub glare: ImageBuf,
}

impl<'a> StageContext<'a> {
    /// Creates a context with an empty glare buffer of `width x height`.
    pub fn new(ops: &'a dyn RasterOps, cancel: &'a CancelToken, width: u32, height: u32) -> Self {
        Self {
            ops,
            cancel,
            glare: ImageBuf::new(width, height),
        }
    }
}

impl std::fmt::Debug for StageContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("glare", &self.glare.dimensions())
            .finish()
    }
}

/// One grading step.
///
/// `apply` works on a straight-alpha image in place and must mix its result
/// with the input by `blend` (`0 < blend <= 1`). Color stages leave alpha
/// alone.
pub trait StageOp: Default + Clone + Send + Sync {
    /// Name used in logs, errors and parameter files.
    const NAME: &'static str;

    /// Whether a default-constructed [`Stage`] is enabled.
    const ENABLED_BY_DEFAULT: bool = true;

    /// Checks parameter ranges.
    fn validate(&self) -> OpsResult<()> {
        Ok(())
    }

    /// Returns true if the parameters make the stage a no-op.
    fn is_identity(&self) -> bool {
        false
    }

    /// Runs the stage.
    fn apply(&self, img: &mut ImageBuf, blend: f32, ctx: &mut StageContext<'_>) -> OpsResult<()>;
}

/// A stage with its enable switch and blend amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[serde(bound(serialize = "P: Serialize", deserialize = "P: StageOp + Deserialize<'de>"))]
pub struct Stage<P> {
    /// Disabled stages are skipped.
    pub enabled: bool,
    /// Mix between the stage input (0) and its output (1).
    pub blend: f32,
    /// Stage parameters.
    #[serde(flatten)]
    pub params: P,
}

impl<P: StageOp> Default for Stage<P> {
    fn default() -> Self {
        Self {
            enabled: P::ENABLED_BY_DEFAULT,
            blend: 1.0,
            params: P::default(),
        }
    }
}

impl<P: StageOp> Stage<P> {
    /// Wraps parameters in an enabled stage at full blend.
    pub fn new(params: P) -> Self {
        Self {
            enabled: true,
            blend: 1.0,
            params,
        }
    }

    /// Sets the blend amount.
    pub fn with_blend(mut self, blend: f32) -> Self {
        self.blend = blend;
        self
    }

    /// Returns a disabled copy.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Stage name.
    pub fn name(&self) -> &'static str {
        P::NAME
    }

    /// Returns true if running the stage can change the image.
    pub fn is_active(&self) -> bool {
        self.enabled && self.blend > 0.0 && !self.params.is_identity()
    }

    /// Checks the blend amount and the stage parameters.
    pub fn validate(&self) -> OpsResult<()> {
        OpsError::check(P::NAME, "blend", self.blend, 0.0, 1.0)?;
        self.params.validate()
    }

    /// Runs the stage if it is active. Returns whether it ran.
    ///
    /// # Errors
    ///
    /// [`OpsError::Cancelled`] if the token was cancelled before or during
    /// the stage, or whatever the stage itself reports.
    pub fn run(&self, img: &mut ImageBuf, ctx: &mut StageContext<'_>) -> OpsResult<bool> {
        ctx.cancel.check()?;
        if !self.is_active() {
            trace!(stage = P::NAME, "skipped");
            return Ok(false);
        }
        debug!(stage = P::NAME, blend = self.blend, "running");
        self.params.apply(img, self.blend.min(1.0), ctx)?;
        Ok(true)
    }
}
