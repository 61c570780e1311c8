//! Radial lens distortion with chromatic dispersion.
//!
//! Each destination pixel computes its source coordinate from a radial model
//! and samples the source bilinearly (edge clamped). Dispersion scales the
//! red and blue channels in opposite directions around green.

use super::for_each_row;
use crate::raster::DispersionAxis;
use grade_core::CHANNELS;

/// Channel scale spread at `dispersion = 1`.
const DISPERSION_SPREAD: f32 = 0.02;

/// Bilinear sample of one channel with clamped edges.
#[inline]
pub fn sample_bilinear(src: &[f32], w: usize, h: usize, c: usize, x: f32, y: f32) -> f32 {
    let x = x.clamp(0.0, (w - 1) as f32);
    let y = y.clamp(0.0, (h - 1) as f32);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src[(y0 * w + x0) * CHANNELS + c];
    let p10 = src[(y0 * w + x1) * CHANNELS + c];
    let p01 = src[(y1 * w + x0) * CHANNELS + c];
    let p11 = src[(y1 * w + x1) * CHANNELS + c];

    let top = p00 + (p10 - p00) * fx;
    let bot = p01 + (p11 - p01) * fx;
    top + (bot - top) * fy
}

/// Distorts interleaved RGBA data.
///
/// Coordinates are normalized so the image corners sit at radius 1. For
/// `amount > 0` the result is rescaled so the corners stay in frame.
pub fn lens_distort(
    src: &[f32],
    w: usize,
    h: usize,
    amount: f32,
    dispersion: f32,
    axis: DispersionAxis,
) -> Vec<f32> {
    let mut dst = vec![0.0f32; w * h * CHANNELS];
    if w == 0 || h == 0 {
        return dst;
    }
    let cx = (w - 1) as f32 * 0.5;
    let cy = (h - 1) as f32 * 0.5;
    let norm = cx.hypot(cy).max(0.5);
    let fit = 1.0 / (1.0 + amount.max(0.0));
    // red, green, blue, alpha
    let offsets = [-1.0f32, 0.0, 1.0, 0.0];

    for_each_row(&mut dst, w * CHANNELS, |y, row| {
        let py = (y as f32 - cy) / norm;
        for x in 0..w {
            let px = (x as f32 - cx) / norm;
            let r2 = px * px + py * py;
            let scale = (1.0 + amount * r2) * fit;
            for (c, off) in offsets.iter().enumerate() {
                let chan = scale * (1.0 + DISPERSION_SPREAD * dispersion * off);
                let (sx, sy) = match axis {
                    DispersionAxis::Radial => (px * chan, py * chan),
                    DispersionAxis::Horizontal => (px * chan, py * scale),
                };
                row[x * CHANNELS + c] = sample_bilinear(src, w, h, c, cx + sx * norm, cy + sy * norm);
            }
        }
    });
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gradient(w: usize, h: usize) -> Vec<f32> {
        let mut v = Vec::with_capacity(w * h * CHANNELS);
        for y in 0..h {
            for x in 0..w {
                v.extend_from_slice(&[x as f32, y as f32, (x + y) as f32, 1.0]);
            }
        }
        v
    }

    #[test]
    fn test_zero_is_identity() {
        let src = gradient(9, 7);
        let out = lens_distort(&src, 9, 7, 0.0, 0.0, DispersionAxis::Radial);
        for (a, b) in out.iter().zip(&src) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_center_fixed() {
        let src = gradient(9, 9);
        let out = lens_distort(&src, 9, 9, 0.5, 0.3, DispersionAxis::Radial);
        let c = (4 * 9 + 4) * CHANNELS;
        assert_abs_diff_eq!(out[c], 4.0, epsilon = 1e-4);
        assert_abs_diff_eq!(out[c + 1], 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_dispersion_splits_channels() {
        let mut src = vec![0.0f32; 21 * 21 * CHANNELS];
        for y in 0..21 {
            for x in 0..21 {
                let v = x as f32;
                let o = (y * 21 + x) * CHANNELS;
                src[o..o + 4].copy_from_slice(&[v, v, v, 1.0]);
            }
        }
        let out = lens_distort(&src, 21, 21, 0.0, 1.0, DispersionAxis::Horizontal);
        let o = (10 * 21 + 20) * CHANNELS;
        assert!(out[o] < out[o + 1]);
        assert!(out[o + 2] >= out[o + 1]);
    }

    #[test]
    fn test_sample_bilinear_mid() {
        let src = gradient(2, 2);
        assert_abs_diff_eq!(sample_bilinear(&src, 2, 2, 0, 0.5, 0.5), 0.5, epsilon = 1e-6);
    }
}
