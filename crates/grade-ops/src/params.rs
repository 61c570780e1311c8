//! The parameter bundle for a grading run.
//!
//! [`GradeParams`] holds one [`Stage`] per grading step plus the user
//! curves. Every level uses `#[serde(default)]`, so a parameter file only
//! needs the values it changes:
//!
//! ```yaml
//! pre:
//!   exposure:
//!     stops: 0.5
//!   glare:
//!     enabled: true
//!     bloom: 0.4
//! post:
//!   saturation:
//!     factor: 1.2
//!   curves:
//!     master: 2
//! curves:
//!   - id: 2
//!     points: [[0.0, 0.0], [0.5, 0.55], [1.0, 1.0]]
//! ```

use crate::cpu::CurveDef;
use crate::raster::CurveId;
use crate::stage::Stage;
use crate::stages::{
    Clarity, ColorBlending, ColorBoost, Curves, Density, Exposure, FilmGrain, Glare, LensDistortion,
    LiftGammaGain, Saturation, Sharpness, SplitTone, Texture, ToneMap, ValueSaturation, Values,
    WhiteBalance,
};
use crate::tone_curve::ToneCurve;
use crate::{OpsError, OpsResult};
use grade_color::BandAdjuster;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Stages run before the detail and look stages, in field order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreParams {
    /// Vibrance.
    pub color_boost: Stage<ColorBoost>,
    /// Temperature and tint.
    pub white_balance: Stage<WhiteBalance>,
    /// Exposure in stops.
    pub exposure: Stage<Exposure>,
    /// Pivoted contrast.
    pub contrast: Stage<ToneCurve>,
    /// Bloom, streaks, ghosts and halation.
    pub glare: Stage<Glare>,
    /// Log-space curve.
    pub tone_map: Stage<ToneMap>,
    /// Seven-band hue correction.
    pub hue_correct: Stage<BandAdjuster>,
}

/// Stages run after [`PreParams`], in field order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostParams {
    /// Fine luminance detail.
    pub texture: Stage<Texture>,
    /// Unsharp mask.
    pub sharpness: Stage<Sharpness>,
    /// Midtone local contrast.
    pub clarity: Stage<Clarity>,
    /// User curves.
    pub curves: Stage<Curves>,
    /// Tone-region soft-light tints.
    pub color_blending: Stage<ColorBlending>,
    /// Shadow lift and highlight gain.
    pub values: Stage<Values>,
    /// Global saturation.
    pub saturation: Stage<Saturation>,
    /// Saturation by tone region.
    pub value_saturation: Stage<ValueSaturation>,
    /// Second seven-band hue correction.
    pub hue_correct: Stage<BandAdjuster>,
    /// Subtractive density.
    pub density: Stage<Density>,
    /// Lift, gamma and gain.
    pub lift_gamma_gain: Stage<LiftGammaGain>,
    /// Shadow and highlight tints.
    pub split_tone: Stage<SplitTone>,
    /// Distortion and dispersion.
    pub lens_distortion: Stage<LensDistortion>,
    /// Cellular grain.
    pub film_grain: Stage<FilmGrain>,
}

/// Complete parameter set for a grading run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeParams {
    /// First phase.
    pub pre: PreParams,
    /// Second phase.
    pub post: PostParams,
    /// User curves referenced by [`Curves`] and [`ToneMap`].
    pub curves: Vec<CurveDef>,
}

/// Applies `$body` to every stage of a phase with `$stage` bound to it.
macro_rules! for_each_pre {
    ($params:expr, $stage:ident => $body:expr) => {{
        let p = $params;
        { let $stage = &p.color_boost; $body }
        { let $stage = &p.white_balance; $body }
        { let $stage = &p.exposure; $body }
        { let $stage = &p.contrast; $body }
        { let $stage = &p.glare; $body }
        { let $stage = &p.tone_map; $body }
        { let $stage = &p.hue_correct; $body }
    }};
}

macro_rules! for_each_post {
    ($params:expr, $stage:ident => $body:expr) => {{
        let p = $params;
        { let $stage = &p.texture; $body }
        { let $stage = &p.sharpness; $body }
        { let $stage = &p.clarity; $body }
        { let $stage = &p.curves; $body }
        { let $stage = &p.color_blending; $body }
        { let $stage = &p.values; $body }
        { let $stage = &p.saturation; $body }
        { let $stage = &p.value_saturation; $body }
        { let $stage = &p.hue_correct; $body }
        { let $stage = &p.density; $body }
        { let $stage = &p.lift_gamma_gain; $body }
        { let $stage = &p.split_tone; $body }
        { let $stage = &p.lens_distortion; $body }
        { let $stage = &p.film_grain; $body }
    }};
}

pub(crate) use {for_each_post, for_each_pre};

impl PreParams {
    /// Validates every stage.
    pub fn validate(&self) -> OpsResult<()> {
        for_each_pre!(self, s => s.validate()?);
        Ok(())
    }

    /// Names of the stages that would change the image.
    pub fn active_stages(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        for_each_pre!(self, s => if s.is_active() { out.push(s.name()) });
        out
    }

    /// Enables or disables every stage.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        self.color_boost.enabled = enabled;
        self.white_balance.enabled = enabled;
        self.exposure.enabled = enabled;
        self.contrast.enabled = enabled;
        self.glare.enabled = enabled;
        self.tone_map.enabled = enabled;
        self.hue_correct.enabled = enabled;
    }
}

impl PostParams {
    /// Validates every stage.
    pub fn validate(&self) -> OpsResult<()> {
        for_each_post!(self, s => s.validate()?);
        Ok(())
    }

    /// Names of the stages that would change the image.
    pub fn active_stages(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        for_each_post!(self, s => if s.is_active() { out.push(s.name()) });
        out
    }

    /// Enables or disables every stage.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        self.texture.enabled = enabled;
        self.sharpness.enabled = enabled;
        self.clarity.enabled = enabled;
        self.curves.enabled = enabled;
        self.color_blending.enabled = enabled;
        self.values.enabled = enabled;
        self.saturation.enabled = enabled;
        self.value_saturation.enabled = enabled;
        self.hue_correct.enabled = enabled;
        self.density.enabled = enabled;
        self.lift_gamma_gain.enabled = enabled;
        self.split_tone.enabled = enabled;
        self.lens_distortion.enabled = enabled;
        self.film_grain.enabled = enabled;
    }
}

impl GradeParams {
    /// Parses parameters from YAML. Does not validate.
    pub fn from_yaml_str(s: &str) -> OpsResult<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Reads parameters from a YAML file. Does not validate.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> OpsResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading grade parameters");
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> OpsResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Enables or disables every stage in both phases.
    pub fn set_all_enabled(&mut self, enabled: bool) {
        self.pre.set_all_enabled(enabled);
        self.post.set_all_enabled(enabled);
    }

    /// Checks every stage and every curve definition.
    ///
    /// # Errors
    ///
    /// The first [`OpsError::InvalidParameter`] or [`OpsError::InvalidCurve`]
    /// found.
    pub fn validate(&self) -> OpsResult<()> {
        self.pre.validate()?;
        self.post.validate()?;

        let mut ids = HashSet::new();
        for def in &self.curves {
            if def.id.0 < CurveId::FIRST_USER {
                return Err(OpsError::InvalidCurve {
                    id: def.id.0,
                    reason: format!("ids below {} are reserved", CurveId::FIRST_USER),
                });
            }
            if !ids.insert(def.id) {
                return Err(OpsError::InvalidCurve {
                    id: def.id.0,
                    reason: "defined more than once".into(),
                });
            }
        }

        let c = &self.post.curves.params;
        let referenced = [c.master, c.red, c.green, c.blue]
            .into_iter()
            .flatten()
            .chain(std::iter::once(self.pre.tone_map.params.curve));
        for id in referenced {
            if id.0 >= CurveId::FIRST_USER && !ids.contains(&id) {
                return Err(OpsError::InvalidCurve {
                    id: id.0,
                    reason: "referenced but not defined".into(),
                });
            }
        }
        Ok(())
    }
}
