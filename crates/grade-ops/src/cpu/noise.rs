//! Hash-based cellular (Worley F1) noise.

/// Maximum octave count.
pub const MAX_OCTAVES: u32 = 8;

#[inline]
fn hash(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

#[inline]
fn hash_cell(ix: i32, iy: i32, iz: i32, seed: u32) -> u32 {
    let mut h = hash(seed ^ 0x9e37_79b9);
    h = hash(h ^ ix as u32);
    h = hash(h ^ (iy as u32).wrapping_mul(0x85eb_ca6b));
    hash(h ^ (iz as u32).wrapping_mul(0xc2b2_ae35))
}

#[inline]
fn unit(h: u32) -> f32 {
    (h >> 8) as f32 / (1u32 << 24) as f32
}

/// Feature point of a cell, in `[0, 1)^3` cell-local coordinates.
#[inline]
fn feature_point(ix: i32, iy: i32, iz: i32, seed: u32) -> [f32; 3] {
    let h = hash_cell(ix, iy, iz, seed);
    [unit(h), unit(hash(h ^ 0x68e3_1da4)), unit(hash(h ^ 0xb529_7a4d))]
}

/// Distance to the nearest feature point, clamped to `[0, 1]`.
pub fn worley_f1(p: [f32; 3], seed: u32) -> f32 {
    let cell = p.map(|v| v.floor());
    let local = [p[0] - cell[0], p[1] - cell[1], p[2] - cell[2]];
    let (cx, cy, cz) = (cell[0] as i32, cell[1] as i32, cell[2] as i32);

    let mut best = f32::MAX;
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let f = feature_point(cx + dx, cy + dy, cz + dz, seed);
                let d = [
                    dx as f32 + f[0] - local[0],
                    dy as f32 + f[1] - local[1],
                    dz as f32 + f[2] - local[2],
                ];
                best = best.min(d[0] * d[0] + d[1] * d[1] + d[2] * d[2]);
            }
        }
    }
    best.sqrt().min(1.0)
}

/// Fractal Worley noise in `[0, 1]`.
///
/// Each octave doubles the frequency and halves the amplitude; the sum is
/// normalized by the total amplitude.
pub fn cellular_noise(coord: [f32; 3], scale: f32, detail: u32, seed: u32) -> f32 {
    let octaves = detail.clamp(1, MAX_OCTAVES);
    let mut freq = scale;
    let mut amp = 1.0;
    let mut sum = 0.0;
    let mut norm = 0.0;
    for octave in 0..octaves {
        let p = coord.map(|v| v * freq);
        sum += worley_f1(p, seed.wrapping_add(octave)) * amp;
        norm += amp;
        freq *= 2.0;
        amp *= 0.5;
    }
    sum / norm
}
