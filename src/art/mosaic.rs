//! # Mosaic Scene
//!
//! A tiled grid of shapes, each spinning at its own noise-driven rate.

use super::{SeededNoise, palette};
use crate::canvas::Surface;
use crate::params::RenderParameters;
use crate::shader::{hash2_f32, lerp};

#[derive(Debug, Clone)]
pub struct Params {
    /// Tile size at density 1.0. Default: 30.0
    pub min_tile: f32,
    /// Tile size at density 0.0. Default: 80.0
    pub max_tile: f32,
    /// Noise sampling scale. Default: 0.01
    pub noise_scale: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_tile: 30.0,
            max_tile: 80.0,
            noise_scale: 0.01,
        }
    }
}

#[derive(Clone)]
pub struct Mosaic {
    params: Params,
    noise: SeededNoise,
}

impl Mosaic {
    pub fn new(seed: u32) -> Self {
        Self {
            params: Params::default(),
            noise: SeededNoise::new(seed),
        }
    }

    pub fn draw(&mut self, surface: &mut Surface, rp: &RenderParameters, t: f32) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let tile = lerp(self.params.max_tile, self.params.min_tile, rp.density.clamp(0.0, 1.0));
        let ns = self.params.noise_scale;
        let perlin = self.noise.get(rp.seed);

        let cols = (w / tile).ceil() as u32;
        let rows = (h / tile).ceil() as u32;
        for j in 0..rows {
            for i in 0..cols {
                let cx = (i as f32 + 0.5) * tile;
                let cy = (j as f32 + 0.5) * tile;
                let n = perlin.noise3(cx * ns, cy * ns, t * 0.2);
                // per-tile spin rate in [-1, 1]
                let rate = hash2_f32(i, j, rp.seed) * 2.0 - 1.0;
                let spin = t * rate * (1.0 + rp.flow_intensity) + n * 2.0;
                let size = tile * 0.4 * rp.scale * (0.8 + 0.2 * n);
                let color = palette(rp, n * 60.0 + (i + j) as f32 * 6.0, n * 0.1);
                surface.fill_shape(rp.shape, (cx, cy), size, spin, color, 0.95);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;

    #[test]
    fn test_fills_every_tile() {
        let rp = RenderParameters {
            density: 1.0,
            ..Default::default()
        };
        let mut surface = Surface::new(90, 60);
        Mosaic::new(rp.seed).draw(&mut surface, &rp, 0.0);
        for (cx, cy) in [(15, 15), (45, 15), (75, 45)] {
            assert_ne!(*surface.image().get_pixel(cx, cy), BACKGROUND);
        }
    }
}
