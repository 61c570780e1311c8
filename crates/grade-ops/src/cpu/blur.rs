//! Separable Gaussian blur.
//!
//! Horizontal pass over rows, then transpose-blur-transpose for the vertical
//! pass so both passes parallelize over rows. Edges are clamped.

use super::for_each_row;
use grade_core::CHANNELS;

/// Builds a normalized 1D Gaussian kernel covering `radius` pixels on each
/// side (`sigma = radius / 3`).
///
/// ```rust
/// use grade_ops::cpu::blur::gaussian_kernel;
///
/// let k = gaussian_kernel(4.0);
/// assert_eq!(k.len(), 9);
/// assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
/// ```
pub fn gaussian_kernel(radius: f32) -> Vec<f32> {
    let half = radius.max(0.0).ceil() as i32;
    let sigma = (radius / 3.0).max(0.3);
    let sigma2 = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-half..=half)
        .map(|x| (-((x * x) as f32) / sigma2).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Blurs interleaved RGBA data. `radius <= 0` returns a copy.
pub fn gaussian_blur(src: &[f32], width: usize, height: usize, radius: f32) -> Vec<f32> {
    if radius <= 0.0 || width == 0 || height == 0 {
        return src.to_vec();
    }
    let kernel = gaussian_kernel(radius);
    let horizontal = convolve_rows(src, width, height, &kernel);
    let transposed = transpose(&horizontal, width, height);
    let vertical = convolve_rows(&transposed, height, width, &kernel);
    transpose(&vertical, height, width)
}

/// Convolves every row with a centered 1D kernel.
fn convolve_rows(src: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    let half = (kernel.len() / 2) as isize;
    let row_len = width * CHANNELS;
    let mut dst = vec![0.0f32; row_len * height];

    for_each_row(&mut dst, row_len, |y, row| {
        let src_row = &src[y * row_len..(y + 1) * row_len];
        for x in 0..width {
            let mut acc = [0.0f32; CHANNELS];
            for (k, &w) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, width as isize - 1) as usize;
                let s = &src_row[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                for c in 0..CHANNELS {
                    acc[c] += s[c] * w;
                }
            }
            row[x * CHANNELS..x * CHANNELS + CHANNELS].copy_from_slice(&acc);
        }
    });
    dst
}

/// Transposes interleaved RGBA data: pixel (x, y) moves to (y, x).
pub(crate) fn transpose(src: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut dst = vec![0.0f32; width * height * CHANNELS];
    for_each_row(&mut dst, height * CHANNELS, |x, col| {
        for y in 0..height {
            let s = (y * width + x) * CHANNELS;
            col[y * CHANNELS..y * CHANNELS + CHANNELS].copy_from_slice(&src[s..s + CHANNELS]);
        }
    });
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_constant_preserved() {
        let src = vec![0.5f32; 16 * 9 * CHANNELS];
        let out = gaussian_blur(&src, 16, 9, 3.0);
        for v in out {
            assert_abs_diff_eq!(v, 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_impulse_spreads() {
        let (w, h) = (9, 9);
        let mut src = vec![0.0f32; w * h * CHANNELS];
        let center = (4 * w + 4) * CHANNELS;
        src[center] = 1.0;
        let out = gaussian_blur(&src, w, h, 2.0);
        assert!(out[center] < 1.0);
        assert!(out[(4 * w + 5) * CHANNELS] > 0.0);
        assert!(out[(5 * w + 4) * CHANNELS] > 0.0);
        let total: f32 = out.iter().step_by(CHANNELS).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_transpose_roundtrip() {
        let src: Vec<f32> = (0..6 * 4 * CHANNELS).map(|v| v as f32).collect();
        let t = transpose(&src, 6, 4);
        assert_eq!(t[(2 * 4 + 1) * CHANNELS], src[(6 + 2) * CHANNELS]);
        assert_eq!(transpose(&t, 4, 6), src);
    }

    #[test]
    fn test_zero_radius_copy() {
        let src = vec![0.1, 0.2, 0.3, 1.0];
        assert_eq!(gaussian_blur(&src, 1, 1, 0.0), src);
    }
}
