//! Linear RGB to perceptual opponent space (L, A, B).
//!
//! The forward transform is `M2 * cbrt(M1 * rgb)`: `M1` maps linear Rec.709
//! to an LMS-like cone space, a signed cube root compresses each cone
//! response, and `M2` rotates into a lightness axis `L` and two opponent
//! axes `A` (green-red) and `B` (blue-yellow).
//!
//! The cube root keeps the sign of its argument, so out-of-gamut colors with
//! negative cone responses round-trip instead of producing NaN.
//!
//! # Example
//!
//! ```rust
//! use grade_color::opponent::{from_opponent, to_opponent};
//!
//! let rgb = [0.8, 0.3, 0.1];
//! let back = from_opponent(to_opponent(rgb));
//! for c in 0..3 {
//!     assert!((back[c] - rgb[c]).abs() < 1e-5);
//! }
//! ```

use grade_math::Mat3;
use std::f32::consts::TAU;

/// Linear RGB to cone response.
pub const RGB_TO_LMS: Mat3 = Mat3::from_rows([
    [0.4122, 0.5363, 0.0514],
    [0.2119, 0.6807, 0.1074],
    [0.0883, 0.2817, 0.6300],
]);

/// Compressed cone response to (L, A, B).
pub const LMS_TO_LAB: Mat3 = Mat3::from_rows([
    [0.2105, 0.7936, -0.0041],
    [1.9780, -2.4286, 0.4506],
    [0.0259, 0.7828, -0.8087],
]);

/// Exact inverse of [`LMS_TO_LAB`].
pub const LAB_TO_LMS: Mat3 = Mat3::from_rows([
    [1.0, 0.39631546, 0.21575337],
    [1.0, -0.10558392, -0.06390023],
    [1.0, -0.08950973, -1.29149633],
]);

/// Exact inverse of [`RGB_TO_LMS`].
pub const LMS_TO_RGB: Mat3 = Mat3::from_rows([
    [4.07687717, -3.30773878, 0.23126930],
    [-1.26845298, 2.60973399, -0.34140785],
    [-0.00423024, -0.70331545, 1.70754526],
]);

/// A color in opponent space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Opponent {
    /// Lightness.
    pub l: f32,
    /// Green-red axis.
    pub a: f32,
    /// Blue-yellow axis.
    pub b: f32,
}

impl Opponent {
    /// Creates an opponent triplet.
    #[inline]
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Distance from the neutral axis.
    #[inline]
    pub fn chroma(&self) -> f32 {
        self.a.hypot(self.b)
    }

    /// Returns `(chroma, hue angle in radians)`.
    #[inline]
    pub fn chroma_hue(&self) -> (f32, f32) {
        chroma_hue(self.a, self.b)
    }

    /// Rebuilds the opponent axes from chroma and hue angle, keeping `l`.
    #[inline]
    pub fn with_chroma_hue(self, chroma: f32, hue: f32) -> Self {
        let (a, b) = from_chroma_hue(chroma, hue);
        Self { l: self.l, a, b }
    }
}

/// Converts linear RGB to opponent space.
#[inline]
pub fn to_opponent(rgb: [f32; 3]) -> Opponent {
    let lms = RGB_TO_LMS.apply(rgb).map(f32::cbrt);
    let [l, a, b] = LMS_TO_LAB.apply(lms);
    Opponent { l, a, b }
}

/// Converts opponent space back to linear RGB.
#[inline]
pub fn from_opponent(lab: Opponent) -> [f32; 3] {
    let lms = LAB_TO_LMS.apply([lab.l, lab.a, lab.b]).map(|v| v * v * v);
    LMS_TO_RGB.apply(lms)
}

/// RGBA variant of [`to_opponent`]. Alpha is returned untouched.
#[inline]
pub fn to_opponent_rgba(px: [f32; 4]) -> (Opponent, f32) {
    (to_opponent([px[0], px[1], px[2]]), px[3])
}

/// RGBA variant of [`from_opponent`].
#[inline]
pub fn from_opponent_rgba(lab: Opponent, alpha: f32) -> [f32; 4] {
    let [r, g, b] = from_opponent(lab);
    [r, g, b, alpha]
}

/// Polar form of the opponent axes: `(chroma, angle)`, angle in radians
/// within `(-PI, PI]`.
#[inline]
pub fn chroma_hue(a: f32, b: f32) -> (f32, f32) {
    (a.hypot(b), b.atan2(a))
}

/// Inverse of [`chroma_hue`].
#[inline]
pub fn from_chroma_hue(chroma: f32, hue: f32) -> (f32, f32) {
    let (s, c) = hue.sin_cos();
    (chroma * c, chroma * s)
}

/// Converts an angle in radians to turns in `[0, 1)`.
#[inline]
pub fn radians_to_turns(angle: f32) -> f32 {
    grade_math::fract(angle / TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLES: [[f32; 3]; 10] = [
        [0.0, 0.0, 0.0],
        [1.0, 1.0, 1.0],
        [0.18, 0.18, 0.18],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.8, 0.3, 0.1],
        [1.5, 0.9, 0.2],
        [-0.1, 0.4, 0.8],
        [0.9, -0.05, 1.2],
    ];

    #[test]
    fn test_roundtrip() {
        for rgb in SAMPLES {
            let back = from_opponent(to_opponent(rgb));
            for c in 0..3 {
                assert_relative_eq!(back[c], rgb[c], epsilon = 1e-5, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn test_negative_never_nan() {
        let lab = to_opponent([-0.5, -0.2, -0.9]);
        assert!(lab.l.is_finite() && lab.a.is_finite() && lab.b.is_finite());
        assert!(lab.l < 0.0);
    }

    #[test]
    fn test_white_is_neutral() {
        let lab = to_opponent([1.0, 1.0, 1.0]);
        assert_relative_eq!(lab.l, 1.0, epsilon = 1e-3);
        assert!(lab.chroma() < 1e-3);
    }

    #[test]
    fn test_inverses_match_published() {
        let published_lab_to_lms = Mat3::from_rows([
            [1.0, 0.3963, 0.2158],
            [1.0, -0.1056, -0.0639],
            [1.0, -0.0895, -1.2915],
        ]);
        let published_lms_to_rgb = Mat3::from_rows([
            [4.0767, -3.3077, 0.2308],
            [-1.2684, 2.6098, -0.3413],
            [-0.0041, -0.7034, 1.7076],
        ]);
        assert!(LAB_TO_LMS.max_abs_diff(&published_lab_to_lms) < 1e-3);
        assert!(LMS_TO_RGB.max_abs_diff(&published_lms_to_rgb) < 1e-3);
    }

    #[test]
    fn test_inverses_exact() {
        assert!((RGB_TO_LMS * LMS_TO_RGB).max_abs_diff(&Mat3::IDENTITY) < 1e-5);
        assert!((LMS_TO_LAB * LAB_TO_LMS).max_abs_diff(&Mat3::IDENTITY) < 1e-5);
    }

    #[test]
    fn test_chroma_hue_roundtrip() {
        let lab = to_opponent([0.7, 0.2, 0.4]);
        let (c, h) = lab.chroma_hue();
        let back = lab.with_chroma_hue(c, h);
        assert_relative_eq!(back.a, lab.a, epsilon = 1e-6);
        assert_relative_eq!(back.b, lab.b, epsilon = 1e-6);
    }

    #[test]
    fn test_alpha_passthrough() {
        let (lab, a) = to_opponent_rgba([0.2, 0.4, 0.6, 0.3]);
        assert_eq!(from_opponent_rgba(lab, a)[3], 0.3);
    }

    #[test]
    fn test_radians_to_turns() {
        assert_relative_eq!(radians_to_turns(-std::f32::consts::FRAC_PI_2), 0.75, epsilon = 1e-6);
    }
}
