//! Chromatic adaptation.
//!
//! White balance in the grading pipeline is a von Kries-style adaptation in
//! the Bradford cone space: the scene white (D65) is mapped to a shifted
//! target white, and the same diagonal cone scaling is applied to every
//! pixel.
//!
//! # Usage
//!
//! ```rust
//! use grade_math::{adapt_matrix, xy_to_xyz, BRADFORD, D65};
//!
//! let warm = xy_to_xyz([0.35, 0.35]);
//! let m = adapt_matrix(BRADFORD, D65, warm);
//! let out = m.apply(D65);
//! assert!((out[0] - warm[0]).abs() < 1e-4);
//! ```

use crate::Mat3;

/// CIE Standard Illuminant D65 as XYZ (Y = 1).
pub const D65: [f32; 3] = [0.95047, 1.0, 1.08883];

/// D65 chromaticity coordinates.
pub const D65_XY: [f32; 2] = [0.3127, 0.3290];

/// Bradford cone response matrix (Lam 1985).
pub const BRADFORD: Mat3 = Mat3::from_rows([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

/// Linear Rec.709 / sRGB primaries to XYZ (D65).
pub const REC709_TO_XYZ: Mat3 = Mat3::from_rows([
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
]);

/// XYZ (D65) to linear Rec.709 / sRGB primaries.
pub const XYZ_TO_REC709: Mat3 = Mat3::from_rows([
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
]);

/// Converts a chromaticity to XYZ with `Y = 1`.
///
/// `y` is clamped away from zero.
#[inline]
pub fn xy_to_xyz(xy: [f32; 2]) -> [f32; 3] {
    let y = xy[1].max(1e-6);
    [xy[0] / y, 1.0, (1.0 - xy[0] - xy[1]) / y]
}

/// Chromaticity of an XYZ triplet. Black maps to D65.
#[inline]
pub fn xyz_to_xy(xyz: [f32; 3]) -> [f32; 2] {
    let sum = xyz[0] + xyz[1] + xyz[2];
    if sum.abs() < 1e-9 {
        return D65_XY;
    }
    [xyz[0] / sum, xyz[1] / sum]
}

/// Computes a chromatic adaptation matrix between two XYZ white points.
///
/// The result is `M^-1 * diag(dst_cone / src_cone) * M` where `M` is the
/// cone response matrix (normally [`BRADFORD`]). Cone responses of the
/// source white that are zero leave that channel unscaled.
///
/// ```rust
/// use grade_math::{adapt_matrix, BRADFORD, D65, Mat3};
///
/// let m = adapt_matrix(BRADFORD, D65, D65);
/// assert!(m.max_abs_diff(&Mat3::IDENTITY) < 1e-5);
/// ```
pub fn adapt_matrix(method: Mat3, src_white: [f32; 3], dst_white: [f32; 3]) -> Mat3 {
    let method_inv = method.inverse().unwrap_or(Mat3::IDENTITY);
    let src = method.apply(src_white);
    let dst = method.apply(dst_white);
    let ratio = |d: f32, s: f32| if s.abs() < 1e-9 { 1.0 } else { d / s };
    let scale = Mat3::diagonal(ratio(dst[0], src[0]), ratio(dst[1], src[1]), ratio(dst[2], src[2]));
    method_inv * scale * method
}

/// Adaptation matrix acting directly on linear Rec.709 RGB.
pub fn rec709_adapt_matrix(src_white: [f32; 3], dst_white: [f32; 3]) -> Mat3 {
    XYZ_TO_REC709 * adapt_matrix(BRADFORD, src_white, dst_white) * REC709_TO_XYZ
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_d65_xy_roundtrip() {
        let xyz = xy_to_xyz(D65_XY);
        assert_abs_diff_eq!(xyz[0], D65[0], epsilon = 1e-3);
        assert_abs_diff_eq!(xyz[2], D65[2], epsilon = 1e-3);
        let xy = xyz_to_xy(xyz);
        assert_abs_diff_eq!(xy[0], D65_XY[0], epsilon = 1e-6);
    }

    #[test]
    fn test_adapt_maps_white() {
        let dst = xy_to_xyz([0.38, 0.37]);
        let m = adapt_matrix(BRADFORD, D65, dst);
        let out = m.apply(D65);
        for c in 0..3 {
            assert_abs_diff_eq!(out[c], dst[c], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rec709_identity() {
        let m = rec709_adapt_matrix(D65, D65);
        assert!(m.max_abs_diff(&Mat3::IDENTITY) < 1e-4);
    }

    #[test]
    fn test_rec709_matrices_inverse() {
        let m = REC709_TO_XYZ * XYZ_TO_REC709;
        assert!(m.max_abs_diff(&Mat3::IDENTITY) < 1e-5);
    }

    #[test]
    fn test_warm_white_raises_red() {
        let m = rec709_adapt_matrix(D65, xy_to_xyz([0.36, 0.36]));
        let white = m.apply([1.0, 1.0, 1.0]);
        assert!(white[0] > white[2]);
    }
}
