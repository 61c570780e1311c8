//! Pixel-level helpers for scene-linear RGBA data.
//!
//! Pixels are plain `[f32; 4]` arrays ([`Rgba`]) in `[R, G, B, A]` order.
//! Linear RGB is the single source of truth; derived representations
//! (opponent, HSV) are computed on demand by `grade-color`.
//!
//! # Alpha
//!
//! Whether color is stored premultiplied is a property of the buffer, not of
//! the pixel. See [`AlphaMode`]. Conversion between the two modes is an exact
//! inverse pair for every alpha except zero, where unpremultiplying leaves
//! the color untouched.
//!
//! # Used By
//!
//! - [`crate::ImageBuf`] - buffer-wide conversions
//! - `grade-color` - luminance weights
//! - `grade-ops` - stage blending

// ============================================================================
// Rec.709 Luminance Constants
// ============================================================================

/// Rec.709 luminance coefficient for red channel.
///
/// Used in the standard luminance formula: `Y = 0.2126*R + 0.7152*G + 0.0722*B`
pub const REC709_LUMA_R: f32 = 0.2126;

/// Rec.709 luminance coefficient for green channel.
pub const REC709_LUMA_G: f32 = 0.7152;

/// Rec.709 luminance coefficient for blue channel.
pub const REC709_LUMA_B: f32 = 0.0722;

/// Rec.709 luminance coefficients as an array [R, G, B].
pub const REC709_LUMA: [f32; 3] = [REC709_LUMA_R, REC709_LUMA_G, REC709_LUMA_B];

/// Largest finite half-float value; the clamp target for infinities.
pub const HALF_MAX: f32 = 65504.0;

/// RGBA pixel in `[R, G, B, A]` order.
pub type Rgba = [f32; 4];

/// Calculate Rec.709 luminance from RGB values.
///
/// # Example
/// ```
/// use grade_core::luminance_rec709;
/// let luma = luminance_rec709([0.5, 0.3, 0.2]);
/// assert!((luma - 0.3353).abs() < 0.0001);
/// ```
#[inline]
pub fn luminance_rec709(rgb: [f32; 3]) -> f32 {
    rgb[0] * REC709_LUMA_R + rgb[1] * REC709_LUMA_G + rgb[2] * REC709_LUMA_B
}

/// Splits an RGBA pixel into its RGB triplet and alpha.
#[inline]
pub fn split_alpha(px: Rgba) -> ([f32; 3], f32) {
    ([px[0], px[1], px[2]], px[3])
}

/// Joins an RGB triplet and alpha into an RGBA pixel.
#[inline]
pub fn with_alpha(rgb: [f32; 3], alpha: f32) -> Rgba {
    [rgb[0], rgb[1], rgb[2], alpha]
}

/// How color relates to alpha in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlphaMode {
    /// Color is independent of alpha (unassociated).
    #[default]
    Straight,
    /// Color has been multiplied by alpha (associated).
    Premultiplied,
}

/// Multiplies color by alpha.
#[inline]
pub fn premultiply(px: Rgba) -> Rgba {
    let a = px[3];
    [px[0] * a, px[1] * a, px[2] * a, a]
}

/// Divides color by alpha.
///
/// At `alpha == 0` the color is returned untouched, which keeps
/// `premultiply(unpremultiply(p)) == p` for fully transparent pixels that
/// carry emission.
#[inline]
pub fn unpremultiply(px: Rgba) -> Rgba {
    let a = px[3];
    if a == 0.0 {
        return px;
    }
    let inv = 1.0 / a;
    [px[0] * inv, px[1] * inv, px[2] * inv, a]
}

/// What to do with NaN and infinite channel values entering the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NonFinitePolicy {
    /// NaN becomes 0, infinities clamp to `±HALF_MAX`.
    #[default]
    Sanitize,
    /// Values are left as they are.
    Passthrough,
}

/// Replaces a non-finite channel value with a finite one.
#[inline]
pub fn sanitize_value(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else if v.is_infinite() {
        HALF_MAX.copysign(v)
    } else {
        v
    }
}

/// Applies [`sanitize_value`] to every channel. Returns the pixel and whether
/// anything changed.
#[inline]
pub fn sanitize_pixel(px: Rgba) -> (Rgba, bool) {
    let out = [
        sanitize_value(px[0]),
        sanitize_value(px[1]),
        sanitize_value(px[2]),
        sanitize_value(px[3]),
    ];
    let changed = !px.iter().all(|v| v.is_finite());
    (out, changed)
}

/// Linear mix of two pixels' RGB, keeping `a`'s alpha.
///
/// `t == 0` returns `a` exactly and `t >= 1` returns `b`'s color exactly.
#[inline]
pub fn mix_rgb(a: Rgba, b: Rgba, t: f32) -> Rgba {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return [b[0], b[1], b[2], a[3]];
    }
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3],
    ]
}

/// Linear mix of all four channels.
///
/// `t == 0` returns `a` exactly and `t >= 1` returns `b` exactly.
#[inline]
pub fn mix_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    if t <= 0.0 {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}
