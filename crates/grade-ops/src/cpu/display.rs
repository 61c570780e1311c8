//! Reference display transform: Reinhard compression then sRGB encoding.

/// sRGB OETF (linear to encoded).
#[inline]
pub fn srgb_oetf(l: f32) -> f32 {
    if l <= 0.0031308 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Per-channel `x / (1 + x)` followed by [`srgb_oetf`]. Negative input maps
/// to 0.
#[inline]
pub fn display_transform(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(|v| {
        let v = v.max(0.0);
        srgb_oetf(v / (1.0 + v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_range() {
        for v in [0.0, 0.18, 1.0, 16.0, 1e4] {
            let d = display_transform([v; 3])[0];
            assert!((0.0..=1.0).contains(&d));
        }
        assert_eq!(display_transform([-1.0; 3]), [0.0; 3]);
    }

    #[test]
    fn test_srgb_knee() {
        assert_abs_diff_eq!(srgb_oetf(0.001), 0.01292, epsilon = 1e-7);
        assert_abs_diff_eq!(srgb_oetf(1.0), 1.0, epsilon = 1e-6);
    }
}
