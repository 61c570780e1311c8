//! Per-channel blend modes used by the tinting stages.
//!
//! Scene-linear values above 1 are allowed for the base; the blend color is
//! clamped to `[0, 1]` since it is a user-picked tint.

/// Soft light of `blend` over `base` (W3C compositing formula).
///
/// A blend value of 0.5 leaves the base unchanged.
#[inline]
pub fn soft_light(base: f32, blend: f32) -> f32 {
    let s = blend.clamp(0.0, 1.0);
    let b = base.max(0.0);
    if s <= 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        let d = if b <= 0.25 {
            ((16.0 * b - 12.0) * b + 4.0) * b
        } else {
            b.sqrt()
        };
        b + (2.0 * s - 1.0) * (d - b)
    }
}

/// Linear mix of two RGB triplets.
#[inline]
pub fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
