//! # Contour Scene
//!
//! Iso-lines of an evolving noise field, like elevation lines on a
//! topographic map, traced with marching squares.
//!
//! ## Marching Squares
//!
//! Each grid cell gets a 4-bit case from which corners lie above the level
//! (tl=8, tr=4, br=2, bl=1). The case selects which cell edges the line
//! crosses; crossing points are linearly interpolated along each edge.
//! Saddle cases (5 and 10) emit two segments.

use super::{SeededNoise, palette};
use crate::canvas::Surface;
use crate::params::RenderParameters;
use crate::shader::{inverse_lerp, lerp};

pub type Segment = ((f32, f32), (f32, f32));

#[derive(Debug, Clone)]
pub struct Params {
    /// Cell size at density 1.0. Default: 8.0
    pub min_cell: f32,
    /// Cell size at density 0.0. Default: 22.0
    pub max_cell: f32,
    /// Noise sampling scale. Default: 0.008
    pub noise_scale: f32,
    /// Contour levels at density 0.0 / 1.0. Default: 3 / 10
    pub min_levels: f32,
    pub max_levels: f32,
    /// Level band the contours are spread over. Default: 0.45
    pub level_span: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_cell: 8.0,
            max_cell: 22.0,
            noise_scale: 0.008,
            min_levels: 3.0,
            max_levels: 10.0,
            level_span: 0.45,
        }
    }
}

#[derive(Clone)]
pub struct Contour {
    params: Params,
    noise: SeededNoise,
    field: Vec<f32>,
}

/// Trace one iso-level through a row-major grid of `cols` × `rows` samples
/// spaced `cell` apart.
pub fn march(field: &[f32], cols: usize, rows: usize, cell: f32, level: f32) -> Vec<Segment> {
    let mut segments = Vec::new();
    if cols < 2 || rows < 2 || field.len() < cols * rows {
        return segments;
    }
    let at = |i: usize, j: usize| field[j * cols + i];

    for j in 0..rows - 1 {
        for i in 0..cols - 1 {
            let (tl, tr, br, bl) = (at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
            let case = ((tl > level) as u8) << 3
                | ((tr > level) as u8) << 2
                | ((br > level) as u8) << 1
                | (bl > level) as u8;
            if case == 0 || case == 15 {
                continue;
            }

            let (x0, y0) = (i as f32 * cell, j as f32 * cell);
            let (x1, y1) = (x0 + cell, y0 + cell);
            let top = (lerp(x0, x1, inverse_lerp(tl, tr, level)), y0);
            let right = (x1, lerp(y0, y1, inverse_lerp(tr, br, level)));
            let bottom = (lerp(x0, x1, inverse_lerp(bl, br, level)), y1);
            let left = (x0, lerp(y0, y1, inverse_lerp(tl, bl, level)));

            match case {
                1 | 14 => segments.push((left, bottom)),
                2 | 13 => segments.push((bottom, right)),
                3 | 12 => segments.push((left, right)),
                4 | 11 => segments.push((top, right)),
                6 | 9 => segments.push((top, bottom)),
                7 | 8 => segments.push((left, top)),
                5 => {
                    segments.push((left, top));
                    segments.push((bottom, right));
                }
                10 => {
                    segments.push((top, right));
                    segments.push((left, bottom));
                }
                _ => {}
            }
        }
    }
    segments
}

impl Contour {
    pub fn new(seed: u32) -> Self {
        Self {
            params: Params::default(),
            noise: SeededNoise::new(seed),
            field: Vec::new(),
        }
    }

    /// Evenly spaced levels across `[-span, span]`.
    pub fn levels_for(&self, density: f32) -> Vec<f32> {
        let p = &self.params;
        let count = lerp(p.min_levels, p.max_levels, density.clamp(0.0, 1.0))
            .round()
            .max(1.0) as usize;
        (0..count)
            .map(|k| lerp(-p.level_span, p.level_span, (k as f32 + 0.5) / count as f32))
            .collect()
    }

    pub fn draw(&mut self, surface: &mut Surface, rp: &RenderParameters, t: f32) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let density = rp.density.clamp(0.0, 1.0);
        let cell = lerp(self.params.max_cell, self.params.min_cell, density);
        let cols = (w / cell).ceil() as usize + 2;
        let rows = (h / cell).ceil() as usize + 2;
        let levels = self.levels_for(density);

        let ns = self.params.noise_scale;
        let warp = rp.flow_intensity * 0.8;
        let perlin = self.noise.get(rp.seed);
        self.field.clear();
        for j in 0..rows {
            for i in 0..cols {
                let (sx, sy) = (i as f32 * cell * ns, j as f32 * cell * ns);
                let bend = perlin.noise3(sx * 0.5, sy * 0.5, t * 0.1) * warp;
                self.field.push(perlin.fbm3(sx + bend, sy - bend, t * 0.15, 3));
            }
        }

        let width = 1.5 * rp.scale;
        for (k, level) in levels.iter().enumerate() {
            let color = palette(rp, k as f32 * 18.0, *level * 0.4);
            for (a, b) in march(&self.field, cols, rows, cell, *level) {
                surface.stroke_segment(a, b, width, color, 0.9);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field_has_no_lines() {
        let field = vec![0.0; 9];
        assert!(march(&field, 3, 3, 10.0, 0.5).is_empty());
        let field = vec![1.0; 9];
        assert!(march(&field, 3, 3, 10.0, 0.5).is_empty());
    }

    #[test]
    fn test_horizontal_edge() {
        // top row low, bottom row high
        let field = [0.0, 0.0, 1.0, 1.0];
        let segments = march(&field, 2, 2, 10.0, 0.5);
        assert_eq!(segments.len(), 1);
        let ((ax, ay), (bx, by)) = segments[0];
        assert_eq!((ax, bx), (0.0, 10.0));
        assert!((ay - 5.0).abs() < 1e-5 && (by - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_crossing_is_interpolated() {
        let field = [0.0, 1.0, 0.0, 1.0];
        let segments = march(&field, 2, 2, 10.0, 0.25);
        assert_eq!(segments.len(), 1);
        let ((ax, _), (bx, _)) = segments[0];
        assert!((ax - 2.5).abs() < 1e-5);
        assert!((bx - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_saddle_emits_two_segments() {
        let field = [1.0, 0.0, 0.0, 1.0];
        assert_eq!(march(&field, 2, 2, 10.0, 0.5).len(), 2);
    }

    #[test]
    fn test_short_field_is_ignored() {
        assert!(march(&[0.0, 1.0], 2, 2, 10.0, 0.5).is_empty());
    }

    #[test]
    fn test_levels_follow_density() {
        let contour = Contour::new(0);
        assert_eq!(contour.levels_for(0.0).len(), 3);
        assert_eq!(contour.levels_for(1.0).len(), 10);
        let levels = contour.levels_for(0.5);
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
    }
}
