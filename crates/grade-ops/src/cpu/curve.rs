//! Monotone cubic curves.
//!
//! Control points are interpolated with a Hermite spline whose slopes are
//! limited (Fritsch-Carlson) so the curve never overshoots between points.
//! Outside the first and last point the curve is held constant.

use crate::raster::CurveId;
use serde::{Deserialize, Serialize};

/// A curve definition as it appears in a parameter file.
///
/// ```yaml
/// id: 2
/// points: [[0.0, 0.0], [0.5, 0.6], [1.0, 1.0]]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDef {
    /// Id the stages refer to.
    pub id: CurveId,
    /// `[x, y]` control points with strictly increasing `x`.
    pub points: Vec<[f32; 2]>,
}

/// Precomputed monotone cubic spline.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneCurve {
    xs: Vec<f32>,
    ys: Vec<f32>,
    slopes: Vec<f32>,
}

impl MonotoneCurve {
    /// Fits a curve through `points`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if there are fewer than two
    /// points, a value is not finite, or `x` does not strictly increase.
    pub fn new(points: &[[f32; 2]]) -> Result<Self, String> {
        if points.len() < 2 {
            return Err(format!("need at least 2 points, got {}", points.len()));
        }
        if points.iter().flatten().any(|v| !v.is_finite()) {
            return Err("non-finite control point".into());
        }
        if points.windows(2).any(|w| w[1][0] <= w[0][0]) {
            return Err("x must strictly increase".into());
        }

        let xs: Vec<f32> = points.iter().map(|p| p[0]).collect();
        let ys: Vec<f32> = points.iter().map(|p| p[1]).collect();
        let n = xs.len();
        let secants: Vec<f32> = (0..n - 1)
            .map(|i| (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))
            .collect();

        let mut slopes = vec![0.0f32; n];
        slopes[0] = secants[0];
        slopes[n - 1] = secants[n - 2];
        for i in 1..n - 1 {
            slopes[i] = if secants[i - 1] * secants[i] <= 0.0 {
                0.0
            } else {
                (secants[i - 1] + secants[i]) * 0.5
            };
        }

        for i in 0..n - 1 {
            if secants[i] == 0.0 {
                slopes[i] = 0.0;
                slopes[i + 1] = 0.0;
                continue;
            }
            let a = slopes[i] / secants[i];
            let b = slopes[i + 1] / secants[i];
            let s = a * a + b * b;
            if s > 9.0 {
                let t = 3.0 / s.sqrt();
                slopes[i] = t * a * secants[i];
                slopes[i + 1] = t * b * secants[i];
            }
        }

        Ok(Self { xs, ys, slopes })
    }

    /// Straight line through (0, 0) and (1, 1).
    pub fn identity() -> Self {
        Self {
            xs: vec![0.0, 1.0],
            ys: vec![0.0, 1.0],
            slopes: vec![1.0, 1.0],
        }
    }

    /// Evaluates the curve.
    pub fn eval(&self, x: f32) -> f32 {
        let n = self.xs.len();
        if x.is_nan() {
            return x;
        }
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }
        let i = self.xs.partition_point(|&k| k <= x).saturating_sub(1).min(n - 2);
        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        h00 * self.ys[i] + h10 * h * self.slopes[i] + h01 * self.ys[i + 1] + h11 * h * self.slopes[i + 1]
    }
}

/// Control points of the built-in [`CurveId::FILMIC`] S-curve.
pub const FILMIC_POINTS: [[f32; 2]; 5] = [
    [0.0, 0.0],
    [0.2, 0.06],
    [0.5, 0.5],
    [0.8, 0.94],
    [1.0, 1.0],
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_passes_through_points() {
        let c = MonotoneCurve::new(&FILMIC_POINTS).unwrap();
        for p in FILMIC_POINTS {
            assert_abs_diff_eq!(c.eval(p[0]), p[1], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_monotone() {
        let c = MonotoneCurve::new(&[[0.0, 0.0], [0.1, 0.5], [0.2, 0.52], [1.0, 1.0]]).unwrap();
        let mut last = c.eval(0.0);
        for i in 1..=200 {
            let y = c.eval(i as f32 / 200.0);
            assert!(y >= last - 1e-6);
            last = y;
        }
    }

    #[test]
    fn test_flat_segment_no_overshoot() {
        let c = MonotoneCurve::new(&[[0.0, 0.0], [0.4, 0.5], [0.6, 0.5], [1.0, 1.0]]).unwrap();
        assert_abs_diff_eq!(c.eval(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_identity_and_clamp() {
        let c = MonotoneCurve::identity();
        assert_abs_diff_eq!(c.eval(0.3), 0.3, epsilon = 1e-6);
        assert_eq!(c.eval(2.0), 1.0);
        assert_eq!(c.eval(-1.0), 0.0);
    }

    #[test]
    fn test_invalid() {
        assert!(MonotoneCurve::new(&[[0.0, 0.0]]).is_err());
        assert!(MonotoneCurve::new(&[[0.5, 0.0], [0.5, 1.0]]).is_err());
        assert!(MonotoneCurve::new(&[[0.0, f32::NAN], [1.0, 1.0]]).is_err());
    }
}
