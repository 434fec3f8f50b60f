//! # Seeded 2D Perlin Noise
//!
//! A small Perlin-style gradient noise used for terrain heights. The permutation
//! table is built once from a seed and never changes, so sampling is a pure
//! function of `(seed, x, y)`.
//!
//! `Perlin2D` implements [`noise::NoiseFn`], which lets the terrain generator
//! accept any generator from the `noise` crate in its place.

use noise::NoiseFn;

/// Number of distinct lattice hashes. Lattice coordinates are masked into this range.
const PERMUTATION_SIZE: usize = 256;

/// Seeded 2D gradient noise producing values in `[0, 1]`.
#[derive(Clone)]
pub struct Perlin2D {
    /// 256 shuffled values repeated twice, so `perm[perm[x] + y + 1]` never wraps.
    perm: [u8; PERMUTATION_SIZE * 2],
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`. Its first and second derivatives
/// vanish at 0 and 1, which keeps the noise smooth across lattice lines.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Four diagonal gradients selected by the low two bits of the hash.
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

impl Perlin2D {
    /// Seed used by the world when none is configured.
    pub const DEFAULT_SEED: u32 = 2025;

    /// Builds the permutation table for `seed` with a Fisher–Yates shuffle.
    pub fn new(seed: u32) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed as u64);
        let mut base = [0u8; PERMUTATION_SIZE];
        for (i, value) in base.iter_mut().enumerate() {
            *value = i as u8;
        }
        for i in (1..PERMUTATION_SIZE).rev() {
            let j = rng.usize(0..=i);
            base.swap(i, j);
        }

        let mut perm = [0u8; PERMUTATION_SIZE * 2];
        perm[..PERMUTATION_SIZE].copy_from_slice(&base);
        perm[PERMUTATION_SIZE..].copy_from_slice(&base);

        Perlin2D { perm }
    }

    /// Samples the noise field at `(x, y)`.
    ///
    /// # Returns
    /// A value in `[0, 1]`. Integer lattice points always map to exactly `0.5`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let xi = (x_floor as i64 & 255) as usize;
        let yi = (y_floor as i64 & 255) as usize;
        let xf = x - x_floor;
        let yf = y - y_floor;
        let u = fade(xf);
        let v = fade(yf);

        let p = &self.perm;
        let aa = p[p[xi] as usize + yi];
        let ab = p[p[xi] as usize + yi + 1];
        let ba = p[p[xi + 1] as usize + yi];
        let bb = p[p[xi + 1] as usize + yi + 1];

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);
        (lerp(x1, x2, v) + 1.0) / 2.0
    }
}

impl Default for Perlin2D {
    fn default() -> Self {
        Perlin2D::new(Self::DEFAULT_SEED)
    }
}

impl NoiseFn<f64, 2> for Perlin2D {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}
