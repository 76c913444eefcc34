//! Hash and gradient noise for procedural generation.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Integer hash function using bit manipulation.
///
/// Produces a pseudo-random u32 from an input u32.
#[inline]
pub fn hash(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x
}

/// Hash a 2D lattice point to a float in [0, 1].
#[inline]
pub fn hash2_f32(x: u32, y: u32, seed: u32) -> f32 {
    let n = hash(
        seed.wrapping_add(x.wrapping_mul(374761393))
            .wrapping_add(y.wrapping_mul(668265263)),
    );
    (n as f32) / (u32::MAX as f32)
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Seeded gradient noise.
///
/// The permutation table is shuffled from the seed, so two generators with
/// the same seed produce the same field. Output is roughly in [-1, 1] and
/// exactly 0 on integer lattice points.
#[derive(Clone)]
pub struct Perlin {
    perm: [u8; 512],
}

impl Perlin {
    pub fn new(seed: u32) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed as u64));

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// 3D noise sample.
    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let xi = (x.floor() as i32 & 255) as usize;
        let yi = (y.floor() as i32 & 255) as usize;
        let zi = (z.floor() as i32 & 255) as usize;
        let xf = x - x.floor();
        let yf = y - y.floor();
        let zf = z - z.floor();

        let (u, v, w) = (fade(xf), fade(yf), fade(zf));
        let p = &self.perm;

        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let lerp = super::lerp;
        lerp(
            lerp(
                lerp(grad(p[aa], xf, yf, zf), grad(p[ba], xf - 1.0, yf, zf), u),
                lerp(grad(p[ab], xf, yf - 1.0, zf), grad(p[bb], xf - 1.0, yf - 1.0, zf), u),
                v,
            ),
            lerp(
                lerp(
                    grad(p[aa + 1], xf, yf, zf - 1.0),
                    grad(p[ba + 1], xf - 1.0, yf, zf - 1.0),
                    u,
                ),
                lerp(
                    grad(p[ab + 1], xf, yf - 1.0, zf - 1.0),
                    grad(p[bb + 1], xf - 1.0, yf - 1.0, zf - 1.0),
                    u,
                ),
                v,
            ),
            w,
        )
    }

    /// 2D noise sample (the z = 0 slice).
    #[inline]
    pub fn noise2(&self, x: f32, y: f32) -> f32 {
        self.noise3(x, y, 0.0)
    }

    /// Fractal Brownian motion over [`Perlin::noise3`].
    ///
    /// Octaves double in frequency and halve in amplitude; the sum is
    /// normalized back to roughly [-1, 1].
    pub fn fbm3(&self, x: f32, y: f32, z: f32, octaves: usize) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves.max(1) {
            value += amplitude * self.noise3(x * frequency, y * frequency, z * frequency);
            max_value += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        value / max_value
    }
}
