//! # Bump Scene
//!
//! A grid of dots pushed around by fractal noise. Each dot swells where the
//! field is high, so the grid reads as a slowly breathing relief.
//!
//! ## Formula
//!
//! ```text
//! spacing = lerp(max_spacing, min_spacing, density)
//! n       = fbm(x * noise_scale, y * noise_scale, t * evolve)
//! offset  = (n, noise(...)) * spacing * flow_intensity
//! size    = spacing * 0.5 * scale * (0.35 + 0.65 * (n + 1) / 2)
//! ```

use super::{SeededNoise, palette};
use crate::canvas::Surface;
use crate::params::RenderParameters;
use crate::shader::lerp;

#[derive(Debug, Clone)]
pub struct Params {
    /// Grid spacing at density 1.0. Default: 12.0
    pub min_spacing: f32,
    /// Grid spacing at density 0.0. Default: 44.0
    pub max_spacing: f32,
    /// Noise sampling scale. Default: 0.006
    pub noise_scale: f32,
    /// Noise evolution per unit time. Default: 0.3
    pub evolve: f32,
    /// fbm octaves. Default: 3
    pub octaves: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_spacing: 12.0,
            max_spacing: 44.0,
            noise_scale: 0.006,
            evolve: 0.3,
            octaves: 3,
        }
    }
}

#[derive(Clone)]
pub struct Bump {
    params: Params,
    noise: SeededNoise,
}

impl Bump {
    pub fn new(seed: u32) -> Self {
        Self {
            params: Params::default(),
            noise: SeededNoise::new(seed),
        }
    }

    pub fn spacing_for(&self, density: f32) -> f32 {
        lerp(self.params.max_spacing, self.params.min_spacing, density.clamp(0.0, 1.0))
    }

    pub fn draw(&mut self, surface: &mut Surface, rp: &RenderParameters, t: f32) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let spacing = self.spacing_for(rp.density);
        let p = &self.params;
        let perlin = self.noise.get(rp.seed);

        let cols = (w / spacing).ceil() as usize + 1;
        let rows = (h / spacing).ceil() as usize + 1;
        for j in 0..rows {
            for i in 0..cols {
                let gx = (i as f32 + 0.5) * spacing;
                let gy = (j as f32 + 0.5) * spacing;
                let (sx, sy) = (gx * p.noise_scale, gy * p.noise_scale);

                let n = perlin.fbm3(sx, sy, t * p.evolve, p.octaves);
                let m = perlin.noise3(sx + 31.7, sy - 12.9, t * p.evolve);
                let x = gx + n * spacing * rp.flow_intensity;
                let y = gy + m * spacing * rp.flow_intensity;

                let height = ((n + 1.0) / 2.0).clamp(0.0, 1.0);
                let size = spacing * 0.5 * rp.scale * (0.35 + 0.65 * height);
                let color = palette(rp, n * 40.0, (height - 0.5) * 0.3);
                surface.fill_shape(rp.shape, (x, y), size, n * 1.5, color, 0.9);
            }
        }
    }
}
