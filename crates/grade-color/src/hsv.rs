//! HSV decomposition of scene-linear RGB.
//!
//! Hue is expressed in turns (`[0, 1)`, red at 0). Value is the channel
//! maximum and is not clamped, so HDR values survive a round trip.
//! Saturation is `(max - min) / max`; colors with a negative minimum give
//! saturation above 1, which recomposes back to the same negative channel.
//!
//! A non-positive maximum has no defined hue or saturation and decomposes
//! to `(0, 0, max)`.

/// HSV triplet with hue in turns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    /// Hue in turns, `[0, 1)`.
    pub h: f32,
    /// Saturation.
    pub s: f32,
    /// Value (channel maximum).
    pub v: f32,
}

impl Hsv {
    /// Creates an HSV triplet.
    #[inline]
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }
}

/// Decomposes linear RGB into HSV.
///
/// ```rust
/// use grade_color::hsv::rgb_to_hsv;
///
/// let hsv = rgb_to_hsv([0.0, 1.0, 0.0]);
/// assert!((hsv.h - 1.0 / 3.0).abs() < 1e-6);
/// assert_eq!(hsv.s, 1.0);
/// ```
#[inline]
pub fn rgb_to_hsv(rgb: [f32; 3]) -> Hsv {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if max <= 0.0 || delta <= 0.0 {
        return Hsv::new(0.0, 0.0, max);
    }

    let h = if max == r {
        (g - b) / delta
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsv::new(grade_math::fract(h / 6.0), delta / max, max)
}

/// Recomposes HSV into linear RGB.
#[inline]
pub fn hsv_to_rgb(hsv: Hsv) -> [f32; 3] {
    let Hsv { h, s, v } = hsv;
    if s == 0.0 {
        return [v, v, v];
    }
    let h6 = grade_math::fract(h) * 6.0;
    let sector = (h6.floor() as i32).clamp(0, 5);
    let f = h6 - sector as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
