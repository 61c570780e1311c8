//! Row-band processing and cancellation.
//!
//! Per-pixel stages split the image into bands of [`BAND_ROWS`] rows. With
//! the `parallel` feature each band runs on the rayon pool; every worker
//! owns a disjoint slice of the output. The [`CancelToken`] is polled before
//! each band, so a cancelled run stops within one band per worker.
//!
//! # Example
//!
//! ```rust
//! use grade_core::ImageBuf;
//! use grade_ops::parallel::{map_rgb, CancelToken};
//!
//! let mut img = ImageBuf::filled(64, 64, [0.5, 0.5, 0.5, 1.0]);
//! map_rgb(&mut img, 1.0, &CancelToken::new(), |rgb| rgb.map(|v| v * 2.0)).unwrap();
//! assert_eq!(img.pixel(10, 10), [1.0, 1.0, 1.0, 1.0]);
//! ```

use crate::{OpsError, OpsResult};
use grade_core::{CHANNELS, ImageBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Rows per parallel work item.
pub const BAND_ROWS: usize = 16;

/// Shared cancellation flag.
///
/// Clones share the same flag, so a token handed to another thread can stop
/// a run in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clears a previous cancellation request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    /// Returns true once [`CancelToken::cancel`] has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns [`OpsError::Cancelled`] if cancellation was requested.
    #[inline]
    pub fn check(&self) -> OpsResult<()> {
        if self.is_cancelled() {
            Err(OpsError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Runs `f(first_row, band)` over row bands of interleaved RGBA data.
pub fn for_each_band<F>(img: &mut ImageBuf, cancel: &CancelToken, f: F) -> OpsResult<()>
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    let row_len = img.row_len();
    if row_len == 0 || img.height() == 0 {
        return Ok(());
    }
    let band_len = row_len * BAND_ROWS;
    let work = |(i, band): (usize, &mut [f32])| -> OpsResult<()> {
        cancel.check()?;
        f(i * BAND_ROWS, band);
        Ok(())
    };

    #[cfg(feature = "parallel")]
    {
        img.data_mut().par_chunks_mut(band_len).enumerate().try_for_each(work)
    }
    #[cfg(not(feature = "parallel"))]
    {
        img.data_mut().chunks_mut(band_len).enumerate().try_for_each(work)
    }
}

#[inline]
fn mix_into(px: &mut [f32], out: [f32; 3], blend: f32) {
    if blend >= 1.0 {
        px[..3].copy_from_slice(&out);
    } else {
        for c in 0..3 {
            px[c] += (out[c] - px[c]) * blend;
        }
    }
}

/// Applies a per-pixel RGB function, mixing the result with the input by
/// `blend`. Alpha is never touched.
pub fn map_rgb<F>(img: &mut ImageBuf, blend: f32, cancel: &CancelToken, f: F) -> OpsResult<()>
where
    F: Fn([f32; 3]) -> [f32; 3] + Sync + Send,
{
    if blend <= 0.0 {
        return Ok(());
    }
    for_each_band(img, cancel, |_, band| {
        for px in band.chunks_exact_mut(CHANNELS) {
            let out = f([px[0], px[1], px[2]]);
            mix_into(px, out, blend);
        }
    })
}

/// Like [`map_rgb`] but also passes the pixel coordinates.
pub fn map_rgb_at<F>(img: &mut ImageBuf, blend: f32, cancel: &CancelToken, f: F) -> OpsResult<()>
where
    F: Fn(u32, u32, [f32; 3]) -> [f32; 3] + Sync + Send,
{
    if blend <= 0.0 {
        return Ok(());
    }
    let width = img.width() as usize;
    for_each_band(img, cancel, |y0, band| {
        for (i, px) in band.chunks_exact_mut(CHANNELS).enumerate() {
            let x = (i % width) as u32;
            let y = (y0 + i / width) as u32;
            let out = f(x, y, [px[0], px[1], px[2]]);
            mix_into(px, out, blend);
        }
    })
}

/// Applies a per-pixel function that also reads a same-sized guide image.
pub fn map_rgb_with<F>(
    img: &mut ImageBuf,
    guide: &ImageBuf,
    blend: f32,
    cancel: &CancelToken,
    f: F,
) -> OpsResult<()>
where
    F: Fn([f32; 3], [f32; 4]) -> [f32; 3] + Sync + Send,
{
    img.check_same_size(guide)?;
    if blend <= 0.0 {
        return Ok(());
    }
    let row_len = img.row_len();
    let guide_data = guide.data();
    for_each_band(img, cancel, |y0, band| {
        let base = y0 * row_len;
        for (i, px) in band.chunks_exact_mut(CHANNELS).enumerate() {
            let o = base + i * CHANNELS;
            let g = [guide_data[o], guide_data[o + 1], guide_data[o + 2], guide_data[o + 3]];
            let out = f([px[0], px[1], px[2]], g);
            mix_into(px, out, blend);
        }
    })
}

/// Copies `processed` RGB into `img`, mixed by `blend`. Alpha of `img` is
/// kept.
pub fn blend_rgb_from(img: &mut ImageBuf, processed: &ImageBuf, blend: f32) -> OpsResult<()> {
    img.check_same_size(processed)?;
    if blend <= 0.0 {
        return Ok(());
    }
    for (dst, src) in img
        .data_mut()
        .chunks_exact_mut(CHANNELS)
        .zip(processed.data().chunks_exact(CHANNELS))
    {
        mix_into(dst, [src[0], src[1], src[2]], blend);
    }
    Ok(())
}

/// Mixes two whole RGBA images: `img = mix(img, other, t)`.
pub fn mix_images(img: &mut ImageBuf, other: &ImageBuf, t: f32) -> OpsResult<()> {
    img.check_same_size(other)?;
    if t >= 1.0 {
        img.data_mut().copy_from_slice(other.data());
        return Ok(());
    }
    if t <= 0.0 {
        return Ok(());
    }
    for (a, b) in img.data_mut().iter_mut().zip(other.data()) {
        *a += (b - *a) * t;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_rgb_keeps_alpha() {
        let mut img = ImageBuf::filled(3, 40, [0.2, 0.4, 0.6, 0.5]);
        map_rgb(&mut img, 1.0, &CancelToken::new(), |_| [1.0, 1.0, 1.0]).unwrap();
        assert!(img.pixels().all(|p| p == [1.0, 1.0, 1.0, 0.5]));
    }

    #[test]
    fn test_map_rgb_blend() {
        let mut img = ImageBuf::filled(2, 2, [0.0, 0.0, 0.0, 1.0]);
        map_rgb(&mut img, 0.25, &CancelToken::new(), |_| [1.0, 2.0, 4.0]).unwrap();
        assert_eq!(img.pixel(1, 1), [0.25, 0.5, 1.0, 1.0]);

        let before = img.clone();
        map_rgb(&mut img, 0.0, &CancelToken::new(), |_| [9.0; 3]).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_map_rgb_at_coords() {
        let mut img = ImageBuf::new(5, 37);
        map_rgb_at(&mut img, 1.0, &CancelToken::new(), |x, y, _| [x as f32, y as f32, 0.0])
            .unwrap();
        assert_eq!(img.pixel(4, 36)[..2], [4.0, 36.0]);
        assert_eq!(img.pixel(2, 17)[..2], [2.0, 17.0]);
    }

    #[test]
    fn test_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let mut img = ImageBuf::new(4, 4);
        let err = map_rgb(&mut img, 1.0, &token, |rgb| rgb).unwrap_err();
        assert!(err.is_cancelled());
        token.reset();
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_map_rgb_with_size_mismatch() {
        let mut img = ImageBuf::new(4, 4);
        let guide = ImageBuf::new(2, 2);
        assert!(map_rgb_with(&mut img, &guide, 1.0, &CancelToken::new(), |rgb, _| rgb).is_err());
    }

    #[test]
    fn test_mix_images() {
        let mut a = ImageBuf::filled(1, 1, [0.0, 0.0, 0.0, 0.0]);
        let b = ImageBuf::filled(1, 1, [1.0, 1.0, 1.0, 1.0]);
        mix_images(&mut a, &b, 0.5).unwrap();
        assert_eq!(a.pixel(0, 0), [0.5; 4]);
    }
}
