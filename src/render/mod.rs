//! # Rendering
//!
//! Drives a [`Scene`] frame by frame on a [`Surface`].
//!
//! ## Frame Order
//!
//! 1. Switch scene if the pattern changed (fresh state, time is kept)
//! 2. Fade the surface by `motion_blur`
//! 3. Advance the time accumulator by `frame_step * speed`
//! 4. Draw the scene
//!
//! A frame that fails, by error or panic, is replaced with a fallback glyph
//! and the next frame runs normally.
//!
//! ## Usage
//!
//! ```
//! use shutterglyph::config::CanvasConfig;
//! use shutterglyph::params::RenderParameters;
//! use shutterglyph::render::Renderer;
//!
//! let params = RenderParameters::default();
//! let mut renderer = Renderer::new(CanvasConfig::THUMBNAIL, &params, None);
//! renderer.frame(&params);
//! let png = renderer.export_png().unwrap();
//! assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
//! ```

pub mod animate;
pub mod export;

pub use animate::{AnimationReport, animate};

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::art::Scene;
use crate::canvas::Surface;
use crate::config::CanvasConfig;
use crate::error::GlyphError;
use crate::params::{RenderParameters, Tint};

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    Fallback,
}

/// Owns the surface and the active scene and draws one frame per call.
///
/// A frame that errors or panics is replaced by the fallback glyph; the
/// time accumulator survives both failures and resizes.
pub struct Renderer {
    config: CanvasConfig,
    surface: Surface,
    scene: Scene,
    time: f64,
    frames: u64,
    failures: u64,
}

impl Renderer {
    pub fn new(config: CanvasConfig, params: &RenderParameters, live: Option<(u32, u32)>) -> Self {
        let surface = Surface::for_config(&config, live);
        let scene = Scene::new(params.pattern, params, (surface.width(), surface.height()));
        Self {
            config,
            surface,
            scene,
            time: 0.0,
            frames: 0,
            failures: 0,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Animation time accumulated so far.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames replaced by the fallback glyph.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Follow a new live size. Animation time is kept.
    pub fn resize(&mut self, live: Option<(u32, u32)>) -> (u32, u32) {
        let before = (self.surface.width(), self.surface.height());
        let after = self.surface.resize(&self.config, live);
        if before != after {
            tracing::debug!(width = after.0, height = after.1, "[render] surface resized");
        }
        after
    }

    fn size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    /// Render one frame with the given parameters.
    pub fn frame(&mut self, params: &RenderParameters) -> FrameOutcome {
        if params.pattern != self.scene.kind() {
            tracing::debug!(
                from = self.scene.kind().name(),
                to = params.pattern.name(),
                "[render] switching scene"
            );
            self.scene = Scene::new(params.pattern, params, self.size());
        }

        self.surface.fade(params.motion_blur);
        let speed = if params.speed.is_finite() { params.speed.max(0.0) } else { 0.0 };
        self.time += self.config.frame_step * speed as f64;
        self.frames += 1;

        self.surface.set_view(params.rotation, params.zoom);
        self.surface.set_tint(params.tint);

        let time = self.time;
        let (scene, surface) = (&mut self.scene, &mut self.surface);
        let result = catch_unwind(AssertUnwindSafe(|| scene.draw(surface, params, time)));

        let error = match result {
            Ok(Ok(())) => return FrameOutcome::Drawn,
            Ok(Err(e)) => e,
            Err(panic) => {
                // state may be half-updated
                self.scene = Scene::new(params.pattern, params, self.size());
                GlyphError::Render(panic_message(panic.as_ref()))
            }
        };

        self.failures += 1;
        tracing::warn!(
            frame = self.frames,
            pattern = params.pattern.name(),
            error = %error,
            "[render] frame failed, drawing fallback"
        );
        self.draw_fallback();
        FrameOutcome::Fallback
    }

    /// Plain ring-and-cross glyph shown in place of a failed frame.
    fn draw_fallback(&mut self) {
        let surface = &mut self.surface;
        surface.clear();
        surface.set_view(0.0, 1.0);
        surface.set_tint(Tint::NONE);

        let (w, h) = (surface.width() as f32, surface.height() as f32);
        let (cx, cy) = (w / 2.0, h / 2.0);
        let r = w.min(h) * 0.2;
        let grey = [0.55, 0.55, 0.6];

        let segments = 48;
        for i in 0..segments {
            let a0 = std::f32::consts::TAU * i as f32 / segments as f32;
            let a1 = std::f32::consts::TAU * (i + 1) as f32 / segments as f32;
            surface.stroke_segment(
                (cx + r * a0.cos(), cy + r * a0.sin()),
                (cx + r * a1.cos(), cy + r * a1.sin()),
                3.0,
                grey,
                1.0,
            );
        }
        let arm = r * 0.6;
        surface.stroke_segment((cx - arm, cy - arm), (cx + arm, cy + arm), 3.0, grey, 1.0);
        surface.stroke_segment((cx - arm, cy + arm), (cx + arm, cy - arm), 3.0, grey, 1.0);
    }

    /// PNG bytes of the current frame at the export scale.
    pub fn export_png(&self) -> Result<Vec<u8>, GlyphError> {
        export::export_png(self.surface.image(), self.config.export_scale)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic".to_string()
    }
}

/// Render `frames` frames and export the last one. Blocking.
pub fn render_still(
    config: CanvasConfig,
    params: &RenderParameters,
    size: Option<(u32, u32)>,
    frames: u32,
) -> Result<Vec<u8>, GlyphError> {
    let mut renderer = Renderer::new(config, params, size);
    for _ in 0..frames.max(1) {
        renderer.frame(params);
    }
    renderer.export_png()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;
    use crate::params::PatternKind;

    fn small() -> CanvasConfig {
        CanvasConfig::THUMBNAIL
    }

    #[test]
    fn test_time_advances_by_speed() {
        let params = RenderParameters {
            speed: 2.0,
            ..Default::default()
        };
        let mut renderer = Renderer::new(small(), &params, Some((100, 100)));
        renderer.frame(&params);
        renderer.frame(&params);
        assert!((renderer.time() - 0.064).abs() < 1e-9);
        assert_eq!(renderer.frames(), 2);
    }

    #[test]
    fn test_time_never_goes_backwards() {
        let params = RenderParameters {
            speed: -3.0,
            ..Default::default()
        };
        let mut renderer = Renderer::new(small(), &params, None);
        renderer.frame(&params);
        assert_eq!(renderer.time(), 0.0);
    }

    #[test]
    fn test_failed_frame_draws_fallback_and_recovers() {
        let good = RenderParameters::default();
        let bad = RenderParameters {
            scale: f32::NAN,
            ..Default::default()
        };
        let mut renderer = Renderer::new(small(), &good, Some((120, 120)));

        assert_eq!(renderer.frame(&bad), FrameOutcome::Fallback);
        assert_eq!(renderer.failures(), 1);
        assert_ne!(*renderer.surface().image().get_pixel(60, 60 - 24), BACKGROUND);

        assert_eq!(renderer.frame(&good), FrameOutcome::Drawn);
        assert_eq!(renderer.failures(), 1);
    }

    #[test]
    fn test_pattern_switch_keeps_time() {
        let mut params = RenderParameters::default();
        let mut renderer = Renderer::new(small(), &params, None);
        renderer.frame(&params);
        let before = renderer.time();

        params.pattern = PatternKind::Contour;
        renderer.frame(&params);
        assert!(renderer.time() > before);
        assert_eq!(renderer.scene.kind(), PatternKind::Contour);
    }

    #[test]
    fn test_resize_keeps_time() {
        let params = RenderParameters::default();
        let mut renderer = Renderer::new(small(), &params, None);
        renderer.frame(&params);
        let t = renderer.time();
        assert_eq!(renderer.resize(Some((400, 300))), (400, 300));
        assert_eq!(renderer.time(), t);
        assert_eq!(renderer.resize(Some((0, 0))), (400, 300));
    }

    #[test]
    fn test_render_still_is_png() {
        let png = render_still(small(), &RenderParameters::default(), Some((64, 64)), 3).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }
}
