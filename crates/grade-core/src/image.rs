//! RGBA float image buffer.
//!
//! [`ImageBuf`] is the container every grading operation reads and writes.
//!
//! # Memory Layout
//!
//! Pixels are stored in **row-major** order, top-to-bottom, with four
//! interleaved `f32` channels:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//!         ...
//! ```
//!
//! # Usage
//!
//! ```rust
//! use grade_core::ImageBuf;
//!
//! let mut img = ImageBuf::new(64, 32);
//! img.set_pixel(10, 10, [1.0, 0.5, 0.25, 1.0]);
//! assert_eq!(img.pixel(10, 10)[0], 1.0);
//! ```
//!
//! # Dependencies
//!
//! - [`half`] - half-float import/export
//! - [`rayon`] - parallel pixel mapping (feature `parallel`)

use crate::pixel::{self, AlphaMode, NonFinitePolicy, Rgba};
use crate::{Error, Result};
use half::f16;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of interleaved channels in an [`ImageBuf`].
pub const CHANNELS: usize = 4;

/// Owned RGBA `f32` image buffer.
///
/// # Example
///
/// ```rust
/// use grade_core::ImageBuf;
///
/// let white = ImageBuf::filled(4, 4, [1.0, 1.0, 1.0, 1.0]);
/// assert_eq!(white.pixel_count(), 16);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuf {
    /// Pixel data, `width * height * 4` values.
    data: Vec<f32>,
    /// Image width in pixels
    width: u32,
    /// Image height in pixels
    height: u32,
    /// Whether color is premultiplied by alpha
    alpha_mode: AlphaMode,
}

impl ImageBuf {
    /// Creates a new transparent black image with straight alpha.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * CHANNELS;
        Self {
            data: vec![0.0; len],
            width,
            height,
            alpha_mode: AlphaMode::Straight,
        }
    }

    /// Creates an image from existing interleaved RGBA data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the data length is not
    /// `width * height * 4`.
    ///
    /// ```rust
    /// use grade_core::ImageBuf;
    ///
    /// assert!(ImageBuf::from_data(2, 2, vec![0.0; 16]).is_ok());
    /// assert!(ImageBuf::from_data(2, 2, vec![0.0; 15]).is_err());
    /// ```
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(CHANNELS))
            .ok_or_else(|| Error::invalid_dimensions(width, height, "image dimensions overflow"))?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} elements, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            alpha_mode: AlphaMode::Straight,
        })
    }

    /// Creates an image filled with one pixel value.
    pub fn filled(width: u32, height: u32, px: Rgba) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&px);
        }
        Self {
            data,
            width,
            height,
            alpha_mode: AlphaMode::Straight,
        }
    }

    /// Creates an image from half-float RGBA data.
    pub fn from_f16(width: u32, height: u32, data: &[f16]) -> Result<Self> {
        Self::from_data(width, height, data.iter().map(|v| v.to_f32()).collect())
    }

    /// Exports the pixel data as half floats.
    pub fn to_f16(&self) -> Vec<f16> {
        self.data.iter().map(|&v| f16::from_f32(v)).collect()
    }

    /// Sets the alpha mode tag without touching the data.
    pub fn with_alpha_mode(mut self, mode: AlphaMode) -> Self {
        self.alpha_mode = mode;
        self
    }

    /// Returns the alpha mode of the buffer.
    #[inline]
    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the raw interleaved data.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the raw interleaved data mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the image and returns its data.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Number of `f32` values in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * CHANNELS
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]]
    }

    /// Returns the pixel at (x, y), or an error if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Rgba> {
        if x < self.width && y < self.height {
            Ok(self.pixel(x, y))
        } else {
            Err(Error::out_of_bounds(x, y, self.width, self.height))
        }
    }

    /// Returns the pixel at clamped coordinates (edge extension).
    #[inline]
    pub fn pixel_clamped(&self, x: i64, y: i64) -> Rgba {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.pixel(x, y)
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let o = self.offset(x, y);
        self.data[o..o + CHANNELS].copy_from_slice(&px);
    }

    /// Fills the entire image with a pixel value.
    pub fn fill(&mut self, px: Rgba) {
        for chunk in self.data.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Returns a row of interleaved data.
    #[inline]
    pub fn row(&self, y: u32) -> &[f32] {
        debug_assert!(y < self.height, "row out of bounds");
        let start = y as usize * self.row_len();
        &self.data[start..start + self.row_len()]
    }

    /// Returns a mutable row of interleaved data.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [f32] {
        debug_assert!(y < self.height, "row out of bounds");
        let len = self.row_len();
        let start = y as usize * len;
        &mut self.data[start..start + len]
    }

    /// Iterates over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|c| [c[0], c[1], c[2], c[3]])
    }

    /// Applies a function to each pixel in place.
    ///
    /// Runs on the rayon pool when the `parallel` feature is enabled.
    ///
    /// ```rust
    /// use grade_core::ImageBuf;
    ///
    /// let mut img = ImageBuf::filled(8, 8, [0.5, 0.5, 0.5, 1.0]);
    /// img.map_pixels(|px| [px[0] * 2.0, px[1] * 2.0, px[2] * 2.0, px[3]]);
    /// assert_eq!(img.pixel(3, 3), [1.0, 1.0, 1.0, 1.0]);
    /// ```
    pub fn map_pixels<F>(&mut self, f: F)
    where
        F: Fn(Rgba) -> Rgba + Sync + Send,
    {
        let apply = |chunk: &mut [f32]| {
            let out = f([chunk[0], chunk[1], chunk[2], chunk[3]]);
            chunk.copy_from_slice(&out);
        };
        #[cfg(feature = "parallel")]
        self.data.par_chunks_exact_mut(CHANNELS).for_each(apply);
        #[cfg(not(feature = "parallel"))]
        self.data.chunks_exact_mut(CHANNELS).for_each(apply);
    }

    /// Returns a gray image whose RGB holds the Rec.709 luminance of each
    /// pixel and whose alpha is 1.
    pub fn luminance_image(&self) -> ImageBuf {
        let mut out = self.clone();
        out.map_pixels(|px| {
            let y = pixel::luminance_rec709([px[0], px[1], px[2]]);
            [y, y, y, 1.0]
        });
        out.alpha_mode = AlphaMode::Straight;
        out
    }

    /// Converts the buffer to straight alpha (no-op if already straight).
    pub fn to_straight(&mut self) {
        if self.alpha_mode == AlphaMode::Premultiplied {
            self.map_pixels(pixel::unpremultiply);
            self.alpha_mode = AlphaMode::Straight;
        }
    }

    /// Converts the buffer to premultiplied alpha (no-op if already
    /// premultiplied).
    pub fn to_premultiplied(&mut self) {
        if self.alpha_mode == AlphaMode::Straight {
            self.map_pixels(pixel::premultiply);
            self.alpha_mode = AlphaMode::Premultiplied;
        }
    }

    /// Converts the buffer to the given alpha mode.
    pub fn convert_alpha(&mut self, mode: AlphaMode) {
        match mode {
            AlphaMode::Straight => self.to_straight(),
            AlphaMode::Premultiplied => self.to_premultiplied(),
        }
    }

    /// Applies a [`NonFinitePolicy`]. Returns the number of pixels that held
    /// a NaN or infinite value.
    pub fn sanitize(&mut self, policy: NonFinitePolicy) -> usize {
        if policy == NonFinitePolicy::Passthrough {
            return 0;
        }
        let mut count = 0;
        for chunk in self.data.chunks_exact_mut(CHANNELS) {
            let (px, changed) = pixel::sanitize_pixel([chunk[0], chunk[1], chunk[2], chunk[3]]);
            if changed {
                chunk.copy_from_slice(&px);
                count += 1;
            }
        }
        count
    }

    /// Errors unless `other` has the same dimensions.
    pub fn check_same_size(&self, other: &ImageBuf) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::dimension_mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_and_access() {
        let mut img = ImageBuf::new(3, 2);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.data().len(), 24);
        img.set_pixel(2, 1, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(img.pixel(2, 1), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(img.row(1)[8..12], [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_get_pixel_bounds() {
        let img = ImageBuf::new(2, 2);
        assert!(img.get_pixel(1, 1).is_ok());
        assert!(img.get_pixel(2, 0).is_err());
    }

    #[test]
    fn test_pixel_clamped() {
        let mut img = ImageBuf::new(2, 1);
        img.set_pixel(0, 0, [1.0, 0.0, 0.0, 1.0]);
        img.set_pixel(1, 0, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(img.pixel_clamped(-5, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.pixel_clamped(9, 3), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_alpha_roundtrip() {
        let mut img = ImageBuf::filled(2, 2, [0.8, 0.6, 0.4, 0.5]);
        img.set_pixel(0, 0, [0.2, 0.1, 0.05, 0.0]);
        let orig = img.clone();
        img.to_premultiplied();
        assert_eq!(img.alpha_mode(), AlphaMode::Premultiplied);
        assert_relative_eq!(img.pixel(1, 1)[0], 0.4, epsilon = 1e-6);
        img.to_straight();
        for (a, b) in img.data().iter().zip(orig.data()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_half_roundtrip() {
        let img = ImageBuf::filled(2, 2, [0.5, 0.25, 1.0, 1.0]);
        let halves = img.to_f16();
        let back = ImageBuf::from_f16(2, 2, &halves).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_sanitize_counts() {
        let mut img = ImageBuf::filled(2, 2, [0.5, 0.5, 0.5, 1.0]);
        img.set_pixel(0, 0, [f32::NAN, 0.0, 0.0, 1.0]);
        img.set_pixel(1, 1, [f32::INFINITY, 0.0, 0.0, 1.0]);
        assert_eq!(img.clone().sanitize(NonFinitePolicy::Passthrough), 0);
        assert_eq!(img.sanitize(NonFinitePolicy::Sanitize), 2);
        assert!(img.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_luminance_image() {
        let img = ImageBuf::filled(1, 1, [1.0, 0.0, 0.0, 0.3]);
        let y = img.luminance_image();
        assert_relative_eq!(y.pixel(0, 0)[1], 0.2126, epsilon = 1e-6);
        assert_eq!(y.pixel(0, 0)[3], 1.0);
    }

    #[test]
    fn test_check_same_size() {
        let a = ImageBuf::new(2, 2);
        let b = ImageBuf::new(3, 2);
        assert!(a.check_same_size(&a.clone()).is_ok());
        assert!(a.check_same_size(&b).is_err());
    }
}
