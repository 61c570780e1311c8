//! End-to-end behavior of the grading pipeline.

use approx::assert_abs_diff_eq;
use grade_color::hue_band::{BandId, all_band_masks};
use grade_color::opponent::{from_opponent, to_opponent};
use grade_color::saturation::saturate;
use grade_color::{BandAdjuster, ToneRanges, rgb_to_hsv};
use grade_core::{AlphaMode, ImageBuf};
use grade_ops::stages::Rgbm;
use grade_ops::{CompositePipeline, CurveDef, CurveId, GradeParams, OpsError, ToneCurve};

/// A 24x20 image with a ramp, a few saturated colors and a hot spot.
fn test_image() -> ImageBuf {
    let (w, h) = (24u32, 20u32);
    let mut img = ImageBuf::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let t = x as f32 / (w - 1) as f32;
            let px = match y % 4 {
                0 => [t, t, t, 1.0],
                1 => [t * 1.5, t * 0.3, t * 0.1, 0.8],
                2 => [0.05, t, 0.6 - 0.5 * t, 1.0],
                _ => [0.2 + t, 0.1, 0.4 * t, 0.5],
            };
            img.set_pixel(x, y, px);
        }
    }
    img.set_pixel(12, 10, [12.0, 11.0, 9.0, 1.0]);
    img
}

/// Every stage enabled with a setting that changes the image.
fn loud_params() -> GradeParams {
    let mut p = GradeParams::default();
    p.set_all_enabled(true);
    p.pre.color_boost.params.strength = 0.4;
    p.pre.white_balance.params.temperature = 0.3;
    p.pre.exposure.params.stops = 0.5;
    p.pre.contrast.params.total = 0.3;
    p.pre.glare.params.size = 4.0;
    p.pre.glare.params.streaks = 0.5;
    p.pre.hue_correct.params.band_mut(BandId::Red).hue_adjust = 0.05;
    p.post.texture.params.amount = 0.4;
    p.post.sharpness.params.amount = 0.8;
    p.post.clarity.params.amount = 0.3;
    p.post.clarity.params.radius = 4.0;
    p.post.curves.params.master = Some(CurveId(2));
    p.post.color_blending.params.highlight_color = [1.0, 0.8, 0.5];
    p.post.color_blending.params.highlight_strength = 0.5;
    p.post.values.params.shadows = 0.2;
    p.post.saturation.params.factor = 1.3;
    p.post.value_saturation.params.shadows = 0.5;
    p.post.hue_correct.params.band_mut(BandId::Blue).chroma_scale = 1.5;
    p.post.density.params.amount = 0.3;
    p.post.lift_gamma_gain.params.gamma = Rgbm::uniform(1.0).with_master(1.2);
    p.post.split_tone.params.shadow_saturation = 0.4;
    p.post.lens_distortion.params.distortion = 0.2;
    p.post.film_grain.params.amount = 0.2;
    p.curves.push(CurveDef {
        id: CurveId(2),
        points: vec![[0.0, 0.0], [0.5, 0.6], [1.0, 1.0]],
    });
    p
}

#[test]
fn white_pixel_all_disabled() {
    let mut params = GradeParams::default();
    params.set_all_enabled(false);
    let pipeline = CompositePipeline::new(params).unwrap();
    let out = pipeline.process_pixel([1.0, 1.0, 1.0, 1.0], 1.0).unwrap();
    assert_eq!(out, [1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn gray_zero_saturation_hsv_unchanged() {
    let gray = [0.5, 0.5, 0.5];
    assert_eq!(saturate(gray, 0.0, 0.0), gray);
}

#[test]
fn pure_red_band_masks() {
    let masks = all_band_masks(rgb_to_hsv([1.0, 0.0, 0.0]).h);
    assert_abs_diff_eq!(masks[BandId::Red as usize].weight, 1.0, epsilon = 1e-6);
    for band in [BandId::Teal, BandId::Blue, BandId::Pink] {
        assert_abs_diff_eq!(masks[band as usize].weight, 0.0, epsilon = 1e-6);
    }

    let adj = BandAdjuster::default();
    assert_eq!(adj.masks([1.0, 0.0, 0.0]), masks);
}

#[test]
fn zero_contrast_is_identity() {
    let curve = ToneCurve::default();
    for rgb in [[0.0, 0.18, 1.0], [-0.5, 3.0, 1e-7], [100.0, 0.001, 0.5]] {
        assert_eq!(curve.apply(rgb), rgb);
    }

    let mut params = GradeParams::default();
    params.pre.contrast.params.pivot = 0.4;
    let pipeline = CompositePipeline::new(params).unwrap();
    let img = test_image();
    assert_eq!(pipeline.process(&img, 1.0).unwrap().image, img);
}

#[test]
fn disabled_stages_are_exact_identity() {
    let mut params = loud_params();
    params.set_all_enabled(false);
    let pipeline = CompositePipeline::new(params).unwrap();
    let img = test_image();
    let out = pipeline.process(&img, 1.0).unwrap();
    assert_eq!(out.image, img);
    assert!(out.glare.data().iter().all(|&v| v == 0.0));
}

#[test]
fn zero_blend_is_exact_identity() {
    let mut params = loud_params();
    params.pre.color_boost.blend = 0.0;
    params.pre.white_balance.blend = 0.0;
    params.pre.exposure.blend = 0.0;
    params.pre.contrast.blend = 0.0;
    params.pre.glare.blend = 0.0;
    params.pre.tone_map.blend = 0.0;
    params.pre.hue_correct.blend = 0.0;
    params.post.texture.blend = 0.0;
    params.post.sharpness.blend = 0.0;
    params.post.clarity.blend = 0.0;
    params.post.curves.blend = 0.0;
    params.post.color_blending.blend = 0.0;
    params.post.values.blend = 0.0;
    params.post.saturation.blend = 0.0;
    params.post.value_saturation.blend = 0.0;
    params.post.hue_correct.blend = 0.0;
    params.post.density.blend = 0.0;
    params.post.lift_gamma_gain.blend = 0.0;
    params.post.split_tone.blend = 0.0;
    params.post.lens_distortion.blend = 0.0;
    params.post.film_grain.blend = 0.0;
    let pipeline = CompositePipeline::new(params).unwrap();
    let img = test_image();
    assert_eq!(pipeline.process(&img, 1.0).unwrap().image, img);
}

#[test]
fn zero_factor_is_exact_identity() {
    let pipeline = CompositePipeline::new(loud_params()).unwrap();
    let img = test_image();
    let out = pipeline.process(&img, 0.0).unwrap();
    assert_eq!(out.image, img);
    assert!(out.glare.data().iter().all(|&v| v == 0.0));
}

#[test]
fn loud_grade_is_finite_and_changes_image() {
    let pipeline = CompositePipeline::new(loud_params()).unwrap();
    let img = test_image();
    let out = pipeline.process(&img, 1.0).unwrap();
    assert!(out.image.data().iter().all(|v| v.is_finite()));
    assert_ne!(out.image, img);
    assert!(out.glare.pixels().any(|p| p[0] > 0.0));
    assert!(out.glare.pixels().all(|p| p[3] == 0.0));
}

#[test]
fn half_factor_between_input_and_full() {
    let mut params = GradeParams::default();
    params.pre.exposure.params.stops = 2.0;
    let pipeline = CompositePipeline::new(params).unwrap();
    let img = ImageBuf::filled(4, 4, [0.1, 0.2, 0.3, 1.0]);
    let full = pipeline.process(&img, 1.0).unwrap().image.pixel(1, 1);
    let half = pipeline.process(&img, 0.5).unwrap().image.pixel(1, 1);
    for c in 0..3 {
        let input = img.pixel(1, 1)[c];
        assert_abs_diff_eq!(half[c], 0.5 * (input + full[c]), epsilon = 1e-6);
    }
}

#[test]
fn glare_output_scaled_by_factor() {
    let mut params = GradeParams::default();
    params.pre.glare.enabled = true;
    params.pre.glare.params.size = 4.0;
    let pipeline = CompositePipeline::new(params).unwrap();
    let img = test_image();
    let full = pipeline.process(&img, 1.0).unwrap().glare;
    let half = pipeline.process(&img, 0.5).unwrap().glare;
    assert!(full.pixel(13, 10)[0] > 0.0);
    assert_abs_diff_eq!(half.pixel(13, 10)[0], full.pixel(13, 10)[0] * 0.5, epsilon = 1e-5);
}

#[test]
fn alpha_preserved_by_color_stages() {
    let mut params = GradeParams::default();
    params.pre.exposure.params.stops = 1.0;
    params.post.saturation.params.factor = 2.0;
    params.post.hue_correct.params.band_mut(BandId::Green).hue_adjust = 0.1;
    let pipeline = CompositePipeline::new(params).unwrap();
    let img = test_image();
    let out = pipeline.process(&img, 1.0).unwrap().image;
    for (a, b) in img.pixels().zip(out.pixels()) {
        assert_eq!(a[3], b[3]);
    }
}

#[test]
fn premultiplied_input_returned_premultiplied() {
    let mut params = GradeParams::default();
    params.pre.exposure.params.stops = 1.0;
    let pipeline = CompositePipeline::new(params).unwrap();

    let img = ImageBuf::filled(2, 2, [0.1, 0.2, 0.3, 0.5]).with_alpha_mode(AlphaMode::Premultiplied);
    let out = pipeline.process(&img, 1.0).unwrap().image;
    assert_eq!(out.alpha_mode(), AlphaMode::Premultiplied);
    let px = out.pixel(0, 0);
    assert_abs_diff_eq!(px[0], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(px[2], 0.6, epsilon = 1e-6);
    assert_eq!(px[3], 0.5);
}

#[test]
fn exposure_on_straight_color_of_premultiplied_pixel() {
    let mut params = GradeParams::default();
    params.pre.exposure.params.offset = 0.1;
    let pipeline = CompositePipeline::new(params).unwrap();
    let img = ImageBuf::filled(1, 1, [0.2, 0.2, 0.2, 0.5]).with_alpha_mode(AlphaMode::Premultiplied);
    let px = pipeline.process(&img, 1.0).unwrap().image.pixel(0, 0);
    // straight 0.4 + 0.1 = 0.5, premultiplied 0.25
    assert_abs_diff_eq!(px[0], 0.25, epsilon = 1e-6);
}

#[test]
fn cancelled_run_reports_cancelled() {
    let pipeline = CompositePipeline::new(loud_params()).unwrap();
    let token = pipeline.cancel_token();
    token.cancel();
    let err = pipeline.process(&test_image(), 1.0).unwrap_err();
    assert!(err.is_cancelled());
    assert!(pipeline.process(&test_image(), 1.0).unwrap_err().is_cancelled());

    token.reset();
    assert!(pipeline.process(&test_image(), 1.0).is_ok());
}

#[test]
fn yaml_partial_override() {
    let yaml = r#"
pre:
  exposure:
    stops: -1.0
post:
  values:
    blend: 0.5
    highlights: 0.4
    ranges:
      highlight_range: 0.25
"#;
    let params = GradeParams::from_yaml_str(yaml).unwrap();
    assert_eq!(params.pre.exposure.params.stops, -1.0);
    assert_eq!(params.post.values.blend, 0.5);
    assert_eq!(params.post.values.params.ranges.highlight_range, 0.25);
    assert_eq!(params.post.values.params.ranges.shadow_range, ToneRanges::default().shadow_range);
    assert_eq!(params.post.saturation, Default::default());
    CompositePipeline::new(params).unwrap();
}

#[test]
fn yaml_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grade.yaml");
    let params = loud_params();
    std::fs::write(&path, params.to_yaml_string().unwrap()).unwrap();
    assert_eq!(GradeParams::from_yaml_file(&path).unwrap(), params);

    let missing = GradeParams::from_yaml_file(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(missing, OpsError::Io(_)));
}

#[test]
fn invalid_parameters_rejected_at_construction() {
    let mut params = GradeParams::default();
    params.post.lift_gamma_gain.params.gamma = Rgbm::uniform(0.0);
    match CompositePipeline::new(params).unwrap_err() {
        OpsError::InvalidParameter { stage, .. } => assert_eq!(stage, "lift_gamma_gain"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn opponent_roundtrip_in_and_out_of_gamut() {
    let samples = [
        [0.18, 0.18, 0.18],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [2.5, 0.4, 0.01],
        [-0.2, 0.5, 1.2],
        [0.0, 0.0, 0.0],
        [16.0, 8.0, 4.0],
    ];
    for rgb in samples {
        let back = from_opponent(to_opponent(rgb));
        for c in 0..3 {
            let tol = 1e-5 * rgb[c].abs().max(1.0);
            assert_abs_diff_eq!(back[c], rgb[c], epsilon = tol);
        }
    }
}

#[test]
fn hue_wrap_continuity() {
    let a = all_band_masks(0.001)[BandId::Red as usize].weight;
    let b = all_band_masks(0.999)[BandId::Red as usize].weight;
    assert_abs_diff_eq!(a, b, epsilon = 1e-5);
}

#[test]
fn saturation_monotonic_in_factor() {
    let rgb = [0.6, 0.3, 0.2];
    let mut last = rgb_to_hsv(saturate(rgb, 0.0, 0.0)).s;
    for i in 1..=6 {
        let s = rgb_to_hsv(saturate(rgb, i as f32 * 0.25, 0.0)).s;
        assert!(s >= last);
        last = s;
    }
    assert_eq!(saturate(rgb, 1.0, 0.0), rgb);
    assert_eq!(saturate(rgb, 1.0, 1.0), rgb);
}

#[test]
fn tone_region_sanity() {
    let ranges = ToneRanges::default();
    let black = ranges.masks(0.0);
    assert_eq!((black.shadow, black.highlight), (1.0, 0.0));
    let white = ranges.masks(1.0);
    assert_eq!((white.shadow, white.highlight), (0.0, 1.0));
    let mid = ranges.masks(0.5);
    assert_eq!(mid.midtone, 1.0);
    assert_eq!(mid.shadow, 0.0);
    assert_eq!(mid.highlight, 0.0);
}
