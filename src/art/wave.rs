//! # Wave Scene
//!
//! Horizontal ribbons of shapes riding sine waves, roughened by Perlin noise.
//!
//! ## Formula
//!
//! ```text
//! rows = lerp(min_rows, max_rows, density)
//! y    = row_y + sin(x * frequency + t * drift + row * 0.6) * gap * amplitude
//!              + noise(x * noise_scale, row * 0.37, t * 0.25) * gap * flow_intensity
//! ```


use super::{SeededNoise, palette};
use crate::canvas::Surface;
use crate::params::RenderParameters;
use crate::shader::lerp;

/// Tuning constants for the wave scene.
#[derive(Debug, Clone)]
pub struct Params {
    /// Ribbons at density 0.0. Default: 4
    pub min_rows: f32,
    /// Ribbons at density 1.0. Default: 16
    pub max_rows: f32,
    /// Horizontal wave frequency. Default: 0.012
    pub frequency: f32,
    /// Phase advance per unit time. Default: 1.6
    pub drift: f32,
    /// Wave height as a fraction of the row gap. Default: 0.45
    pub amplitude: f32,
    /// Noise sampling scale. Default: 0.004
    pub noise_scale: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_rows: 4.0,
            max_rows: 16.0,
            frequency: 0.012,
            drift: 1.6,
            amplitude: 0.45,
            noise_scale: 0.004,
        }
    }
}

#[derive(Clone)]
pub struct Wave {
    params: Params,
    noise: SeededNoise,
}

impl Wave {
    pub fn new(seed: u32) -> Self {
        Self {
            params: Params::default(),
            noise: SeededNoise::new(seed),
        }
    }

    /// Number of ribbons drawn at a density.
    pub fn rows_for(&self, density: f32) -> usize {
        lerp(self.params.min_rows, self.params.max_rows, density.clamp(0.0, 1.0))
            .round()
            .max(1.0) as usize
    }

    pub fn draw(&mut self, surface: &mut Surface, rp: &RenderParameters, t: f32) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let rows = self.rows_for(rp.density);
        let gap = h / (rows + 1) as f32;
        let step = lerp(28.0, 10.0, rp.density.clamp(0.0, 1.0));
        let size = (step * 0.45 * rp.scale).max(1.0);
        let p = &self.params;
        let perlin = self.noise.get(rp.seed);

        for row in 0..rows {
            let row_f = row as f32;
            let base_y = gap * (row_f + 1.0);
            let mut x = -step;
            while x <= w + step {
                let n = perlin.noise3(x * p.noise_scale, row_f * 0.37, t * 0.25);
                let y = base_y
                    + (x * p.frequency + t * p.drift + row_f * 0.6).sin() * gap * p.amplitude
                    + n * gap * rp.flow_intensity;
                let color = palette(rp, row_f * 12.0 + n * 30.0, n * 0.15);
                let radius = size * (0.75 + 0.5 * n.abs());
                surface.fill_shape(rp.shape, (x, y), radius, t * 0.5 + x * 0.01, color, 0.85);
                x += step;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_density() {
        let wave = Wave::new(1);
        assert_eq!(wave.rows_for(0.0), 4);
        assert_eq!(wave.rows_for(1.0), 16);
        assert!(wave.rows_for(0.5) > wave.rows_for(0.2));
    }

    #[test]
    fn test_draw_is_deterministic() {
        let rp = RenderParameters::default();
        let render = || {
            let mut surface = Surface::new(160, 120);
            Wave::new(rp.seed).draw(&mut surface, &rp, 2.5);
            surface.image().clone()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_time_moves_ribbons() {
        let rp = RenderParameters::default();
        let mut a = Surface::new(160, 120);
        let mut b = Surface::new(160, 120);
        let mut wave = Wave::new(rp.seed);
        wave.draw(&mut a, &rp, 0.0);
        wave.draw(&mut b, &rp, 1.0);
        assert_ne!(a.image(), b.image());
    }
}
