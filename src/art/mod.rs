//! # Pattern Scenes
//!
//! Animated generators that draw onto a [`Surface`]. Each pattern lives in
//! its own module with a `Params` struct of tuning constants and a state
//! struct that owns whatever it needs between frames.
//!
//! [`Scene`] has one variant per [`PatternKind`]. Switching patterns builds a
//! fresh variant, so no animation state carries across a switch.
//!
//! ## Adding a New Pattern
//!
//! 1. Create `src/art/mypattern.rs` with a state struct exposing `new` and `draw`
//! 2. Add `pub mod mypattern;` below
//! 3. Add a [`PatternKind`] variant and a [`Scene`] variant for it

pub mod bump;
pub mod contour;
pub mod flow;
pub mod mosaic;
pub mod wave;

use crate::canvas::Surface;
use crate::error::GlyphError;
use crate::params::{PatternKind, RenderParameters};
use crate::shader::{Perlin, hsl_to_rgb};

/// Perlin field that follows the seed in the parameters.
#[derive(Clone)]
pub struct SeededNoise {
    seed: u32,
    perlin: Perlin,
}

impl SeededNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            perlin: Perlin::new(seed),
        }
    }

    /// The field for `seed`, rebuilt only when the seed changed.
    pub fn get(&mut self, seed: u32) -> &Perlin {
        if seed != self.seed {
            *self = Self::new(seed);
        }
        &self.perlin
    }
}

/// Fill color `offset` degrees from the base hue.
///
/// `lift` shifts lightness; brightness 1.0 gives the flash palette.
pub fn palette(params: &RenderParameters, offset: f32, lift: f32) -> [f32; 3] {
    let lightness = (0.25 + 0.35 * params.brightness + lift).clamp(0.05, 0.95);
    hsl_to_rgb(params.base_hue + offset, 0.7, lightness)
}

/// Reject parameter sets no scene can draw.
pub fn validate(params: &RenderParameters) -> Result<(), GlyphError> {
    let checks = [
        ("density", params.density),
        ("flow_intensity", params.flow_intensity),
        ("scale", params.scale),
        ("zoom", params.zoom),
        ("speed", params.speed),
        ("base_hue", params.base_hue),
        ("brightness", params.brightness),
    ];
    for (name, value) in checks {
        if !value.is_finite() {
            return Err(GlyphError::Render(format!("{} is not finite", name)));
        }
    }
    if params.scale <= 0.0 || params.density <= 0.0 {
        return Err(GlyphError::Render(format!(
            "scale and density must be positive (scale={}, density={})",
            params.scale, params.density
        )));
    }
    Ok(())
}

/// The active pattern and its animation state.
pub enum Scene {
    Wave(wave::Wave),
    Bump(bump::Bump),
    Contour(contour::Contour),
    Flow(flow::Flow),
    Mosaic(mosaic::Mosaic),
}

impl Scene {
    /// Fresh state for `kind`.
    pub fn new(kind: PatternKind, params: &RenderParameters, size: (u32, u32)) -> Self {
        match kind {
            PatternKind::Wave => Scene::Wave(wave::Wave::new(params.seed)),
            PatternKind::Bump => Scene::Bump(bump::Bump::new(params.seed)),
            PatternKind::Contour => Scene::Contour(contour::Contour::new(params.seed)),
            PatternKind::Flow => Scene::Flow(flow::Flow::new(params, size)),
            PatternKind::Mosaic => Scene::Mosaic(mosaic::Mosaic::new(params.seed)),
        }
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Scene::Wave(_) => PatternKind::Wave,
            Scene::Bump(_) => PatternKind::Bump,
            Scene::Contour(_) => PatternKind::Contour,
            Scene::Flow(_) => PatternKind::Flow,
            Scene::Mosaic(_) => PatternKind::Mosaic,
        }
    }

    /// Draw one frame at animation time `time`.
    pub fn draw(
        &mut self,
        surface: &mut Surface,
        params: &RenderParameters,
        time: f64,
    ) -> Result<(), GlyphError> {
        validate(params)?;
        let t = time as f32;
        match self {
            Scene::Wave(s) => s.draw(surface, params, t),
            Scene::Bump(s) => s.draw(surface, params, t),
            Scene::Contour(s) => s.draw(surface, params, t),
            Scene::Flow(s) => s.draw(surface, params, t),
            Scene::Mosaic(s) => s.draw(surface, params, t),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;

    #[test]
    fn test_scene_kind_matches() {
        let params = RenderParameters::default();
        for kind in PatternKind::ALL {
            assert_eq!(Scene::new(kind, &params, (100, 100)).kind(), kind);
        }
    }

    #[test]
    fn test_every_scene_draws_something() {
        for kind in PatternKind::ALL {
            let params = RenderParameters {
                pattern: kind,
                density: 0.8,
                ..Default::default()
            };
            let mut surface = Surface::new(200, 200);
            let mut scene = Scene::new(kind, &params, (200, 200));
            scene.draw(&mut surface, &params, 1.0).unwrap();
            scene.draw(&mut surface, &params, 1.1).unwrap();
            let painted = surface.image().pixels().filter(|p| **p != BACKGROUND).count();
            assert!(painted > 100, "{:?} painted only {} pixels", kind, painted);
        }
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = RenderParameters {
            scale: f32::NAN,
            ..Default::default()
        };
        let mut surface = Surface::new(50, 50);
        let mut scene = Scene::new(PatternKind::Wave, &params, (50, 50));
        assert!(scene.draw(&mut surface, &params, 0.0).is_err());
    }

    #[test]
    fn test_seeded_noise_follows_seed() {
        let mut noise = SeededNoise::new(1);
        let a = noise.get(1).noise2(0.5, 0.5);
        let b = noise.get(2).noise2(0.5, 0.5);
        assert_eq!(SeededNoise::new(2).get(2).noise2(0.5, 0.5), b);
        assert_eq!(Perlin::new(1).noise2(0.5, 0.5), a);
    }

    #[test]
    fn test_palette_brightness() {
        let dim = palette(&RenderParameters { brightness: 0.0, ..Default::default() }, 0.0, 0.0);
        let bright = palette(&RenderParameters { brightness: 1.0, ..Default::default() }, 0.0, 0.0);
        assert!(bright.iter().sum::<f32>() > dim.iter().sum::<f32>());
    }
}
