//! Square max/min morphology with a soft falloff.

use super::blur::{gaussian_blur, transpose};
use super::for_each_row;
use grade_core::CHANNELS;

/// Dilates (`size > 0`) or erodes (`size < 0`) with a square structuring
/// element of radius `|size|` pixels, then blurs over `falloff` pixels.
pub fn dilate_erode(src: &[f32], width: usize, height: usize, size: f32, falloff: f32) -> Vec<f32> {
    let radius = size.abs().round() as usize;
    let grown = if radius == 0 || width == 0 || height == 0 {
        src.to_vec()
    } else {
        let dilate = size > 0.0;
        let rows = extrema_rows(src, width, height, radius, dilate);
        let t = transpose(&rows, width, height);
        let cols = extrema_rows(&t, height, width, radius, dilate);
        transpose(&cols, height, width)
    };
    if falloff > 0.0 {
        gaussian_blur(&grown, width, height, falloff)
    } else {
        grown
    }
}

/// Running max (or min) over a window of `2 * radius + 1` pixels per row.
fn extrema_rows(src: &[f32], width: usize, height: usize, radius: usize, max: bool) -> Vec<f32> {
    let row_len = width * CHANNELS;
    let mut dst = vec![0.0f32; row_len * height];
    for_each_row(&mut dst, row_len, |y, row| {
        let src_row = &src[y * row_len..(y + 1) * row_len];
        for x in 0..width {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius).min(width - 1);
            for c in 0..CHANNELS {
                let mut v = src_row[lo * CHANNELS + c];
                for sx in lo + 1..=hi {
                    let s = src_row[sx * CHANNELS + c];
                    v = if max { v.max(s) } else { v.min(s) };
                }
                row[x * CHANNELS + c] = v;
            }
        }
    });
    dst
}
