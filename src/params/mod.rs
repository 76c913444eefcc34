//! # Render Parameters
//!
//! The tunable values that drive one frame of pattern drawing, the mapping
//! from [`ImageMetadata`](crate::metadata::ImageMetadata) to those values,
//! and the [`ParameterStore`] the controls write into.
//!
//! ```
//! use rand::{SeedableRng, rngs::StdRng};
//! use shutterglyph::metadata::ImageMetadata;
//! use shutterglyph::params::{ParamId, ParameterStore, map_metadata};
//!
//! let metadata = ImageMetadata { iso: Some(2000), ..Default::default() };
//! let mut store = ParameterStore::new(map_metadata(&metadata, &mut StdRng::seed_from_u64(1)));
//! assert_eq!(store.snapshot().density, 1.0);
//!
//! store.set(ParamId::Density, 0.3);
//! assert_eq!(store.snapshot().density, 0.3);
//! ```

pub mod mapping;
pub mod store;

pub use mapping::map_metadata;
pub use store::{ParamId, ParameterStore};

use serde::{Deserialize, Serialize};

/// Which procedural drawing routine is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Sinusoidal ribbons of shapes
    Wave,
    /// Noise-perturbed dot field
    Bump,
    /// Marching-squares contour lines
    Contour,
    /// Legacy: particles advected through a noise flow field
    Flow,
    /// Legacy: rotating grid of shapes
    Mosaic,
}

impl PatternKind {
    /// Options of the three-way pattern selector, in display order.
    pub const SELECTOR: [PatternKind; 3] =
        [PatternKind::Wave, PatternKind::Bump, PatternKind::Contour];

    /// Every pattern, including the legacy ones.
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Wave,
        PatternKind::Bump,
        PatternKind::Contour,
        PatternKind::Flow,
        PatternKind::Mosaic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Wave => "wave",
            PatternKind::Bump => "bump",
            PatternKind::Contour => "contour",
            PatternKind::Flow => "flow",
            PatternKind::Mosaic => "mosaic",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn by_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL.into_iter().find(|k| k.name() == lower)
    }
}

/// Primitive drawn by the dot-based patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
    Rhombus,
    Star,
}

/// Hue/saturation blend applied to every fill color.
///
/// `strength` 0.0 is the "no tint" marker; see [`Tint::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    /// Target hue in degrees [0, 360)
    pub hue: f32,
    /// Target saturation [0, 1]
    pub saturation: f32,
    /// Blend amount [0, 1]
    pub strength: f32,
}

impl Tint {
    pub const NONE: Tint = Tint {
        hue: 0.0,
        saturation: 0.0,
        strength: 0.0,
    };

    pub fn new(hue: f32, saturation: f32, strength: f32) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            saturation: saturation.clamp(0.0, 1.0),
            strength: strength.clamp(0.0, 1.0),
        }
    }

    pub fn is_none(&self) -> bool {
        self.strength <= 0.0
    }
}

impl Default for Tint {
    fn default() -> Self {
        Tint::NONE
    }
}

/// Everything one frame needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParameters {
    pub pattern: PatternKind,
    pub shape: ShapeKind,
    /// Primitive density [0.2, 1.0]
    pub density: f32,
    /// Noise displacement strength [0.1, 1.0]
    pub flow_intensity: f32,
    pub particle_count: u32,
    /// Palette base hue in degrees
    pub base_hue: f32,
    /// Palette lightness factor [0, 1]
    pub brightness: f32,
    pub tint: Tint,
    /// Rotation around the canvas center, degrees
    pub rotation: f32,
    /// Primitive size multiplier
    pub scale: f32,
    /// Canvas zoom around the center
    pub zoom: f32,
    /// Animation speed multiplier
    pub speed: f32,
    /// Trail retention per frame; 0.0 clears the surface every frame
    pub motion_blur: f32,
    /// Noise seed
    pub seed: u32,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            pattern: PatternKind::Wave,
            shape: ShapeKind::Circle,
            density: 0.5,
            flow_intensity: 0.5,
            particle_count: 150,
            base_hue: 200.0,
            brightness: 0.85,
            tint: Tint::NONE,
            rotation: 0.0,
            scale: 1.0,
            zoom: 1.0,
            speed: 1.0,
            motion_blur: 0.0,
            seed: 42,
        }
    }
}
