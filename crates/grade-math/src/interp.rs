//! Interpolation and windowing utilities.
//!
//! The grading operators are built from a small vocabulary of shader-style
//! scalar functions:
//!
//! - Linear interpolation ([`lerp`], [`mix`], [`inverse_lerp`])
//! - Smooth windows ([`smoothstep`], [`smootherstep`])
//! - Circular helpers for hue in turns ([`fract`], [`pingpong`], [`wrap_signed`])
//!
//! # Usage
//!
//! ```rust
//! use grade_math::{lerp, pingpong, smoothstep};
//!
//! assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
//! assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
//!
//! // Distance on the hue circle, correct across the 0/1 seam
//! assert!((pingpong(0.95, 0.5) - 0.05).abs() < 1e-6);
//! ```

/// Linear interpolation between two values.
///
/// Returns `a` when `t = 0.0`, and `b` when `t = 1.0`.
/// For values outside [0, 1], the result is extrapolated.
///
/// ```rust
/// use grade_math::lerp;
///
/// assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
/// assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
/// ```
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Mix: alias for [`lerp`], as in shader languages.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    lerp(a, b, t)
}

/// Inverse linear interpolation.
///
/// Returns 0 when `a == b`.
///
/// ```rust
/// use grade_math::inverse_lerp;
///
/// assert_eq!(inverse_lerp(0.0, 10.0, 5.0), 0.5);
/// assert_eq!(inverse_lerp(3.0, 3.0, 5.0), 0.0);
/// ```
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        0.0
    } else {
        (value - a) / (b - a)
    }
}

/// Clamps a value to [0, 1].
///
/// NaN maps to 0.
#[inline]
pub fn saturate(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Hermite smoothstep, `t * t * (3 - 2t)` on the normalized input.
///
/// A degenerate window (`edge0 == edge1`) acts as a hard step at the edge.
///
/// ```rust
/// use grade_math::smoothstep;
///
/// assert_eq!(smoothstep(0.0, 1.0, 0.0), 0.0);
/// assert_eq!(smoothstep(0.0, 1.0, 1.0), 1.0);
/// assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
/// ```
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() < f32::EPSILON {
        return step(edge0, x);
    }
    let t = saturate(inverse_lerp(edge0, edge1, x));
    t * t * (3.0 - 2.0 * t)
}

/// Perlin's smootherstep, `t^3 (t (6t - 15) + 10)`.
///
/// Zero first and second derivatives at both edges. Degenerate windows
/// behave like [`smoothstep`].
///
/// ```rust
/// use grade_math::smootherstep;
///
/// assert_eq!(smootherstep(0.0, 1.0, 0.0), 0.0);
/// assert_eq!(smootherstep(0.0, 1.0, 1.0), 1.0);
/// ```
#[inline]
pub fn smootherstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() < f32::EPSILON {
        return step(edge0, x);
    }
    let t = saturate(inverse_lerp(edge0, edge1, x));
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Returns 0 for `x < edge`, 1 otherwise.
#[inline]
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

/// Fractional part, always in `[0, 1)` (also for negative input).
///
/// ```rust
/// use grade_math::fract;
///
/// assert!((fract(1.75) - 0.75).abs() < 1e-6);
/// assert!((fract(-0.25) - 0.75).abs() < 1e-6);
/// ```
#[inline]
pub fn fract(x: f32) -> f32 {
    let f = x - x.floor();
    // -tiny - floor(-tiny) rounds to exactly 1.0
    if f >= 1.0 { 0.0 } else { f }
}

/// Triangle wave bouncing between 0 and `scale`.
///
/// `pingpong(x, 0.5)` is the distance between two hues in turns: it rises
/// from 0 to 0.5 and falls back to 0 every full turn.
///
/// A zero scale returns 0.
///
/// ```rust
/// use grade_math::pingpong;
///
/// assert!((pingpong(0.2, 0.5) - 0.2).abs() < 1e-6);
/// assert!((pingpong(0.7, 0.5) - 0.3).abs() < 1e-6);
/// assert!((pingpong(-0.2, 0.5) - 0.2).abs() < 1e-6);
/// ```
#[inline]
pub fn pingpong(x: f32, scale: f32) -> f32 {
    if scale == 0.0 {
        return 0.0;
    }
    (fract((x - scale) / (scale * 2.0)) * scale * 2.0 - scale).abs()
}

/// Wraps a difference in turns into `[-0.5, 0.5)`.
///
/// ```rust
/// use grade_math::wrap_signed;
///
/// assert!((wrap_signed(0.9) - (-0.1)).abs() < 1e-6);
/// assert!((wrap_signed(-0.9) - 0.1).abs() < 1e-6);
/// ```
#[inline]
pub fn wrap_signed(x: f32) -> f32 {
    fract(x + 0.5) - 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 100.0, 0.25), 25.0);
        assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
    }

    #[test]
    fn test_saturate_nan() {
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(2.0), 1.0);
        assert_eq!(saturate(-1.0), 0.0);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!(smoothstep(0.0, 1.0, 0.25) < 0.25);
        assert!(smoothstep(0.0, 1.0, 0.75) > 0.75);
    }

    #[test]
    fn test_smoothstep_degenerate() {
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.6), 1.0);
    }

    #[test]
    fn test_smootherstep_midpoint() {
        assert_abs_diff_eq!(smootherstep(0.0, 1.0, 0.5), 0.5, epsilon = 1e-6);
        assert!(smootherstep(0.0, 1.0, 0.1) < smoothstep(0.0, 1.0, 0.1));
    }

    #[test]
    fn test_pingpong_symmetry() {
        for i in 0..20 {
            let x = i as f32 * 0.05;
            assert_abs_diff_eq!(pingpong(x, 0.5), pingpong(-x, 0.5), epsilon = 1e-6);
            assert_abs_diff_eq!(pingpong(x, 0.5), pingpong(x + 1.0, 0.5), epsilon = 1e-5);
        }
        assert_eq!(pingpong(0.3, 0.0), 0.0);
    }

    #[test]
    fn test_pingpong_seam() {
        assert_abs_diff_eq!(pingpong(0.001, 0.5), pingpong(0.999, 0.5), epsilon = 1e-5);
        assert_abs_diff_eq!(pingpong(0.5, 0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_fract_negative_tiny() {
        let f = fract(-1e-9);
        assert!((0.0..1.0).contains(&f));
    }

    #[test]
    fn test_wrap_signed_range() {
        for i in -40..40 {
            let w = wrap_signed(i as f32 * 0.1);
            assert!((-0.5..0.5).contains(&w), "{w}");
        }
    }
}
