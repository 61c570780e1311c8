//! # grade-ops
//!
//! Color grading pipeline for scene-linear RGBA images.
//!
//! # Modules
//!
//! - [`pipeline`] - [`CompositePipeline`], the two-phase grade
//! - [`params`] - [`GradeParams`], the YAML-backed parameter bundle
//! - [`stage`] - the [`StageOp`] trait and the [`Stage`] wrapper
//! - [`stages`] - every grading stage
//! - [`tone_curve`] - pivoted contrast curve
//! - [`raster`] - the [`RasterOps`] trait for spatial primitives
//! - [`cpu`] - [`CpuRasterOps`], the reference primitives
//! - [`parallel`] - row-band processing and [`CancelToken`]
//!
//! # Example
//!
//! ```rust
//! use grade_core::ImageBuf;
//! use grade_ops::{CompositePipeline, GradeParams};
//!
//! let params = GradeParams::from_yaml_str(
//!     "pre:\n  contrast:\n    total: 0.3\npost:\n  saturation:\n    factor: 1.2\n",
//! )
//! .unwrap();
//! let pipeline = CompositePipeline::new(params).unwrap();
//!
//! let img = ImageBuf::filled(32, 32, [0.4, 0.2, 0.1, 1.0]);
//! let out = pipeline.process(&img, 1.0).unwrap();
//! assert_eq!(out.image.dimensions(), (32, 32));
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - row bands and CPU primitives run on rayon (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod cpu;
pub mod parallel;
pub mod params;
pub mod pipeline;
pub mod raster;
pub mod stage;
pub mod stages;
pub mod tone_curve;

pub use cpu::{CpuRasterOps, CurveDef};
pub use error::{OpsError, OpsResult};
pub use parallel::CancelToken;
pub use params::{GradeParams, PostParams, PreParams};
pub use pipeline::{CompositePipeline, GradeOutput};
pub use raster::{CurveId, DispersionAxis, GlareMode, RasterOps};
pub use stage::{Stage, StageContext, StageOp};
pub use tone_curve::ToneCurve;
