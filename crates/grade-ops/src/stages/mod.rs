//! Grading stages.
//!
//! | stage            | type                | phase      |
//! |------------------|---------------------|------------|
//! | color_boost      | [`ColorBoost`]      | pre        |
//! | white_balance    | [`WhiteBalance`]    | pre        |
//! | exposure         | [`Exposure`]        | pre        |
//! | contrast         | [`ToneCurve`]       | pre        |
//! | glare            | [`Glare`]           | pre        |
//! | tone_map         | [`ToneMap`]         | pre        |
//! | hue_correct      | [`BandAdjuster`]    | pre, post  |
//! | texture          | [`Texture`]         | post       |
//! | sharpness        | [`Sharpness`]       | post       |
//! | clarity          | [`Clarity`]         | post       |
//! | curves           | [`Curves`]          | post       |
//! | color_blending   | [`ColorBlending`]   | post       |
//! | values           | [`Values`]          | post       |
//! | saturation       | [`Saturation`]      | post       |
//! | value_saturation | [`ValueSaturation`] | post       |
//! | density          | [`Density`]         | post       |
//! | lift_gamma_gain  | [`LiftGammaGain`]   | post       |
//! | split_tone       | [`SplitTone`]       | post       |
//! | lens_distortion  | [`LensDistortion`]  | post       |
//! | film_grain       | [`FilmGrain`]       | post       |
//!
//! [`ToneCurve`]: crate::tone_curve::ToneCurve
//! [`BandAdjuster`]: grade_color::BandAdjuster

pub mod color;
pub mod detail;
pub mod optics;
pub mod tint;
pub mod tone;

pub use color::{ColorBoost, Density, Exposure, Saturation, ValueSaturation, WhiteBalance};
pub use detail::{Clarity, Sharpness, Texture};
pub use optics::{FilmGrain, Glare, LensDistortion};
pub use tint::{ColorBlending, SplitTone};
pub use tone::{Curves, LiftGammaGain, Rgbm, ToneMap, Values};
