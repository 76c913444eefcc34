//! # Canvas Configuration
//!
//! Fixed sizing and timing constants for the pattern canvas.
//!
//! ## Presets
//!
//! | Preset | Default size | Bounds | Frame rate | Export scale |
//! |--------|--------------|--------|------------|--------------|
//! | STUDIO | 800×600 | 200..=4096 | 30 fps | 2× |
//! | THUMBNAIL | 320×240 | 64..=640 | 30 fps | 1× |
//!
//! ## Usage
//!
//! ```
//! use shutterglyph::config::CanvasConfig;
//!
//! let config = CanvasConfig::STUDIO;
//! assert_eq!(config.resolve_size(Some((0, 0)), None), (800, 600));
//! assert_eq!(config.resolve_size(Some((10_000, 50)), None), (4096, 200));
//! ```

use std::time::Duration;

/// # Canvas Configuration
///
/// ## Sizing
///
/// - **default_width / default_height**: used when neither the live container
///   size nor a previously known size is usable
/// - **min_size / max_size**: per-axis clamp applied to every resolved size
///
/// ## Timing
///
/// - **fps**: frames per second of the animation loop
/// - **frame_step**: time accumulator increment per frame at speed 1.0
#[derive(Debug, Clone, Copy)]
pub struct CanvasConfig {
    /// Preset name
    pub name: &'static str,

    /// Fallback width in pixels
    pub default_width: u32,

    /// Fallback height in pixels
    pub default_height: u32,

    /// Smallest allowed width/height
    pub min_size: u32,

    /// Largest allowed width/height
    pub max_size: u32,

    /// Animation loop frame rate
    pub fps: u32,

    /// Time advanced per frame at speed 1.0
    pub frame_step: f64,

    /// Export upscale factor
    pub export_scale: u32,
}

impl CanvasConfig {
    /// Interactive studio canvas.
    pub const STUDIO: CanvasConfig = CanvasConfig {
        name: "studio",
        default_width: 800,
        default_height: 600,
        min_size: 200,
        max_size: 4096,
        fps: 30,
        frame_step: 0.016,
        export_scale: 2,
    };

    /// Small previews (tests, quick CLI runs).
    pub const THUMBNAIL: CanvasConfig = CanvasConfig {
        name: "thumbnail",
        default_width: 320,
        default_height: 240,
        min_size: 64,
        max_size: 640,
        fps: 30,
        frame_step: 0.016,
        export_scale: 1,
    };

    /// Duration between two frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Resolve a drawing surface size.
    ///
    /// Fallback chain: live layout size, then the last known size, then the
    /// preset default. A size counts as usable only if both axes are non-zero.
    /// The result is clamped to `[min_size, max_size]` on each axis.
    pub fn resolve_size(
        &self,
        live: Option<(u32, u32)>,
        last_known: Option<(u32, u32)>,
    ) -> (u32, u32) {
        let usable = |s: Option<(u32, u32)>| s.filter(|&(w, h)| w > 0 && h > 0);
        let (w, h) = usable(live)
            .or_else(|| usable(last_known))
            .unwrap_or((self.default_width, self.default_height));
        (
            w.clamp(self.min_size, self.max_size),
            h.clamp(self.min_size, self.max_size),
        )
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::STUDIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_size_wins() {
        let c = CanvasConfig::STUDIO;
        assert_eq!(c.resolve_size(Some((1024, 768)), Some((640, 480))), (1024, 768));
    }

    #[test]
    fn test_zero_live_falls_back_to_last_known() {
        let c = CanvasConfig::STUDIO;
        assert_eq!(c.resolve_size(Some((0, 768)), Some((640, 480))), (640, 480));
    }

    #[test]
    fn test_zero_everything_falls_back_to_default() {
        let c = CanvasConfig::STUDIO;
        assert_eq!(c.resolve_size(Some((0, 0)), Some((0, 0))), (800, 600));
        assert_eq!(c.resolve_size(None, None), (800, 600));
    }

    #[test]
    fn test_clamped_to_bounds() {
        let c = CanvasConfig::STUDIO;
        assert_eq!(c.resolve_size(Some((50, 9000)), None), (200, 4096));
    }

    #[test]
    fn test_frame_interval() {
        let c = CanvasConfig::STUDIO;
        let ms = c.frame_interval().as_secs_f64() * 1000.0;
        assert!((ms - 33.333).abs() < 0.01);
    }
}
