//! Threshold-based glare: bloom, streaks and ghosts.
//!
//! All three modes start from the same bright pass and return only the
//! glare contribution, tinted, with alpha 0.

use super::blur::{gaussian_blur, transpose};
use super::for_each_row;
use super::warp::sample_bilinear;
use crate::raster::GlareMode;
use grade_core::{CHANNELS, luminance_rec709};
use grade_math::{smoothstep, step};

/// Bloom band radii as fractions of `size`, with weights.
const BLOOM_BANDS: [(f32, f32); 3] = [(0.25, 0.5), (0.5, 0.3), (1.0, 0.2)];

/// Ghost positions (scale through the image center) and weights.
const GHOSTS: [(f32, f32); 3] = [(-1.0, 0.5), (-0.5, 0.3), (0.6, 0.2)];

/// Keeps pixels whose luminance exceeds `threshold`.
///
/// `smoothness` in `[0, 1]` widens the knee around the threshold;
/// 0 is a hard cut.
pub fn bright_pass(src: &[f32], threshold: f32, smoothness: f32) -> Vec<f32> {
    let knee = threshold.abs().max(1e-3) * smoothness.clamp(0.0, 1.0);
    let mut out = src.to_vec();
    for px in out.chunks_exact_mut(CHANNELS) {
        let l = luminance_rec709([px[0], px[1], px[2]]);
        let w = if knee > 0.0 {
            smoothstep(threshold - knee, threshold + knee, l)
        } else {
            step(threshold, l)
        };
        for v in &mut px[..3] {
            *v = v.max(0.0) * w;
        }
        px[3] = 0.0;
    }
    out
}

/// Computes the glare contribution for one mode.
#[allow(clippy::too_many_arguments)]
pub fn glare(
    src: &[f32],
    w: usize,
    h: usize,
    threshold: f32,
    smoothness: f32,
    size: f32,
    tint: [f32; 3],
    mode: GlareMode,
) -> Vec<f32> {
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let bright = bright_pass(src, threshold, smoothness);
    let size = size.max(0.0);
    let mut out = match mode {
        GlareMode::Bloom => bloom(&bright, w, h, size),
        GlareMode::Streaks => streaks(&bright, w, h, size),
        GlareMode::Ghosts => ghosts(&bright, w, h, size),
    };
    for px in out.chunks_exact_mut(CHANNELS) {
        for c in 0..3 {
            px[c] *= tint[c];
        }
        px[3] = 0.0;
    }
    out
}

fn bloom(bright: &[f32], w: usize, h: usize, size: f32) -> Vec<f32> {
    let mut acc = vec![0.0f32; bright.len()];
    for (frac, weight) in BLOOM_BANDS {
        let band = gaussian_blur(bright, w, h, size * frac);
        for (a, b) in acc.iter_mut().zip(&band) {
            *a += b * weight;
        }
    }
    acc
}

/// Exponential smear along rows in both directions, averaged.
fn smear_rows(src: &[f32], w: usize, decay: f32) -> Vec<f32> {
    let row_len = w * CHANNELS;
    let mut dst = vec![0.0f32; src.len()];
    let gain = 1.0 - decay;
    for_each_row(&mut dst, row_len, |y, row| {
        let s = &src[y * row_len..(y + 1) * row_len];
        let mut acc = [0.0f32; CHANNELS];
        for x in 0..w {
            for c in 0..CHANNELS {
                acc[c] = acc[c] * decay + s[x * CHANNELS + c] * gain;
                row[x * CHANNELS + c] = acc[c] * 0.5;
            }
        }
        acc = [0.0; CHANNELS];
        for x in (0..w).rev() {
            for c in 0..CHANNELS {
                acc[c] = acc[c] * decay + s[x * CHANNELS + c] * gain;
                row[x * CHANNELS + c] += acc[c] * 0.5;
            }
        }
    });
    dst
}

fn streaks(bright: &[f32], w: usize, h: usize, size: f32) -> Vec<f32> {
    if size <= 0.0 {
        return bright.to_vec();
    }
    let decay = (-3.0 / size.max(1.0)).exp();
    let horizontal = smear_rows(bright, w, decay);
    let t = transpose(bright, w, h);
    let vertical = transpose(&smear_rows(&t, h, decay), h, w);
    horizontal
        .iter()
        .zip(&vertical)
        .map(|(a, b)| (a + b) * 0.5)
        .collect()
}

fn ghosts(bright: &[f32], w: usize, h: usize, size: f32) -> Vec<f32> {
    let cx = (w - 1) as f32 * 0.5;
    let cy = (h - 1) as f32 * 0.5;
    let mut dst = vec![0.0f32; bright.len()];
    for_each_row(&mut dst, w * CHANNELS, |y, row| {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            for (scale, weight) in GHOSTS {
                let sx = cx + dx * scale;
                let sy = cy + dy * scale;
                if sx < 0.0 || sy < 0.0 || sx > (w - 1) as f32 || sy > (h - 1) as f32 {
                    continue;
                }
                for c in 0..3 {
                    row[x * CHANNELS + c] += sample_bilinear(bright, w, h, c, sx, sy) * weight;
                }
            }
        }
    });
    gaussian_blur(&dst, w, h, size * 0.25)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hot_spot(w: usize, h: usize, x: usize, y: usize) -> Vec<f32> {
        let mut src = vec![0.1f32; w * h * CHANNELS];
        let o = (y * w + x) * CHANNELS;
        src[o..o + 4].copy_from_slice(&[20.0, 20.0, 20.0, 1.0]);
        src
    }

    #[test]
    fn test_bright_pass_threshold() {
        let out = bright_pass(&hot_spot(4, 4, 1, 1), 1.0, 0.0);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[(4 + 1) * CHANNELS], 20.0);
        assert!(out.iter().skip(3).step_by(CHANNELS).all(|&a| a == 0.0));
    }

    #[test]
    fn test_bloom_spreads() {
        let src = hot_spot(15, 15, 7, 7);
        let out = glare(&src, 15, 15, 1.0, 0.0, 4.0, [1.0; 3], GlareMode::Bloom);
        assert!(out[(7 * 15 + 9) * CHANNELS] > 0.0);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn test_streaks_axis_aligned() {
        let src = hot_spot(15, 15, 7, 7);
        let out = glare(&src, 15, 15, 1.0, 0.0, 8.0, [1.0; 3], GlareMode::Streaks);
        let along = out[(7 * 15 + 12) * CHANNELS];
        let diagonal = out[(12 * 15 + 12) * CHANNELS];
        assert!(along > 0.0);
        assert_eq!(diagonal, 0.0);
    }

    #[test]
    fn test_ghost_mirrored() {
        let src = hot_spot(21, 21, 3, 10);
        let out = glare(&src, 21, 21, 1.0, 0.0, 0.0, [1.0; 3], GlareMode::Ghosts);
        assert!(out[(10 * 21 + 17) * CHANNELS] > 0.0);
    }

    #[test]
    fn test_tint() {
        let src = hot_spot(9, 9, 4, 4);
        let out = glare(&src, 9, 9, 1.0, 0.0, 2.0, [1.0, 0.0, 0.0], GlareMode::Bloom);
        let o = (4 * 9 + 4) * CHANNELS;
        assert!(out[o] > 0.0);
        assert_eq!(out[o + 1], 0.0);
    }
}
