//! # Flow Scene
//!
//! Particles advected through a noise-based vector field. With motion blur
//! on, their paths smear into flowing strands.
//!
//! ```text
//! angle = noise(x * noise_scale, y * noise_scale, t * evolve) * TAU * turns
//! pos  += (cos angle, sin angle) * step * flow_intensity * speed
//! ```
//!
//! Particles leaving the canvas wrap to the opposite edge.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use super::{SeededNoise, palette};
use crate::canvas::Surface;
use crate::params::RenderParameters;

#[derive(Debug, Clone)]
pub struct Params {
    /// Noise sampling scale. Default: 0.003
    pub noise_scale: f32,
    /// Field evolution per unit time. Default: 0.1
    pub evolve: f32,
    /// Full turns per unit of noise. Default: 2.0
    pub turns: f32,
    /// Pixels moved per frame at full intensity. Default: 3.0
    pub step: f32,
    /// Particle radius at scale 1.0. Default: 2.5
    pub radius: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            noise_scale: 0.003,
            evolve: 0.1,
            turns: 2.0,
            step: 3.0,
            radius: 2.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Hue offset fixed at spawn
    pub hue: f32,
}

#[derive(Clone)]
pub struct Flow {
    params: Params,
    noise: SeededNoise,
    rng: StdRng,
    particles: Vec<Particle>,
}

impl Flow {
    pub fn new(rp: &RenderParameters, size: (u32, u32)) -> Self {
        let mut flow = Self {
            params: Params::default(),
            noise: SeededNoise::new(rp.seed),
            rng: StdRng::seed_from_u64(rp.seed as u64),
            particles: Vec::new(),
        };
        flow.sync_count(rp.particle_count as usize, size.0 as f32, size.1 as f32);
        flow
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Grow or shrink the population to `count`, spawning inside the canvas.
    fn sync_count(&mut self, count: usize, w: f32, h: f32) {
        self.particles.truncate(count);
        while self.particles.len() < count {
            let particle = Particle {
                x: self.rng.random_range(0.0..w.max(1.0)),
                y: self.rng.random_range(0.0..h.max(1.0)),
                hue: self.rng.random_range(-30.0..30.0),
            };
            self.particles.push(particle);
        }
    }

    pub fn draw(&mut self, surface: &mut Surface, rp: &RenderParameters, t: f32) {
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        self.sync_count(rp.particle_count as usize, w, h);

        let p = &self.params;
        let perlin = self.noise.get(rp.seed);
        let stride = p.step * rp.flow_intensity * rp.speed.max(0.1);
        let radius = p.radius * rp.scale;

        for particle in &mut self.particles {
            let (sx, sy) = (particle.x * p.noise_scale, particle.y * p.noise_scale);
            let angle = perlin.noise3(sx, sy, t * p.evolve) * TAU * p.turns;
            particle.x = wrap(particle.x + angle.cos() * stride, w);
            particle.y = wrap(particle.y + angle.sin() * stride, h);

            let color = palette(rp, particle.hue, 0.1);
            surface.fill_shape(rp.shape, (particle.x, particle.y), radius, angle, color, 0.8);
        }
    }
}

/// Wrap into `[0, size)`.
fn wrap(v: f32, size: f32) -> f32 {
    let r = v.rem_euclid(size);
    if r >= size { 0.0 } else { r }
}
