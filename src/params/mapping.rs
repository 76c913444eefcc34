//! Metadata → render parameter rules.
//!
//! Each output field has its own rule chain. Rules that need randomness draw
//! from the caller's generator, so a fixed seed gives fixed parameters.
//!
//! ## Density
//!
//! Piecewise-linear over ISO breakpoints, clamped at both ends:
//!
//! ```text
//! ISO      24    100    400    800    2000
//! density  0.20  0.35   0.55   0.75   1.00
//! ```
//!
//! ## Flow
//!
//! Logarithmic in the f-number: f/1.4 → 1.0, f/16 → 0.1.

use rand::Rng;
use rand::rngs::StdRng;

use super::{PatternKind, RenderParameters, ShapeKind, Tint};
use crate::metadata::{ImageMetadata, Season, TimeOfDay};
use crate::shader::{hash, lerp, remap_clamped};

/// ISO breakpoints and the density at each.
pub const DENSITY_CURVE: [(f32, f32); 5] = [
    (24.0, 0.20),
    (100.0, 0.35),
    (400.0, 0.55),
    (800.0, 0.75),
    (2000.0, 1.00),
];

pub const MIN_DENSITY: f32 = 0.20;
pub const MAX_DENSITY: f32 = 1.00;

/// Probability of a bright (flash) palette when flash is unknown.
pub const UNKNOWN_FLASH_PROBABILITY: f64 = 0.3;

/// Density for a sensitivity value.
pub fn density_for_iso(iso: f32) -> f32 {
    let (first_iso, first_density) = DENSITY_CURVE[0];
    if iso <= first_iso {
        return first_density;
    }
    for pair in DENSITY_CURVE.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if iso <= x1 {
            return lerp(y0, y1, (iso - x0) / (x1 - x0));
        }
    }
    MAX_DENSITY
}

/// Shape from the lens classification; unknown lenses pick circle or triangle.
pub fn shape_for_lens(lens_type: Option<&str>, rng: &mut StdRng) -> ShapeKind {
    let lower = lens_type.map(str::to_lowercase).unwrap_or_default();
    if lower.contains("ultra") {
        ShapeKind::Star
    } else if lower.contains("wide") {
        ShapeKind::Circle
    } else if lower.contains("tele") {
        ShapeKind::Rectangle
    } else if lower.contains("macro") {
        ShapeKind::Rhombus
    } else if rng.random_bool(0.5) {
        ShapeKind::Circle
    } else {
        ShapeKind::Triangle
    }
}

/// Flow intensity from the f-number.
pub fn flow_for_aperture(f_number: f32) -> f32 {
    if !f_number.is_finite() || f_number <= 0.0 {
        return 0.5;
    }
    let t = ((f_number / 1.4).ln() / (16.0f32 / 1.4).ln()).clamp(0.0, 1.0);
    lerp(1.0, 0.1, t)
}

/// Particle count from pixel count: 60 + 20 per megapixel, capped at 400.
pub fn particles_for_dimensions(width: Option<u32>, height: Option<u32>) -> u32 {
    match (width, height) {
        (Some(w), Some(h)) => {
            let megapixels = (w as f64 * h as f64) / 1_000_000.0;
            (60.0 + megapixels * 20.0).clamp(60.0, 400.0) as u32
        }
        _ => 150,
    }
}

/// Day/night pattern bias from a hash of the capture hour.
pub fn pattern_for_time(hour: Option<u32>, time_of_day: Option<TimeOfDay>) -> PatternKind {
    const DAY: [PatternKind; 2] = [PatternKind::Wave, PatternKind::Bump];
    const NIGHT: [PatternKind; 2] = [PatternKind::Contour, PatternKind::Bump];

    let dark = match (hour, time_of_day) {
        (_, Some(tod)) => tod.is_dark(),
        (Some(h), None) => TimeOfDay::from_hour(h).is_dark(),
        (None, None) => return PatternKind::Wave,
    };
    let set = if dark { NIGHT } else { DAY };
    let pick = hour.map(|h| hash(h) as usize % 2).unwrap_or(0);
    set[pick]
}

/// Palette base hue from season, nudged by longitude.
pub fn hue_for(season: Option<Season>, longitude: Option<f64>) -> f32 {
    let base = match season {
        Some(Season::Spring) => 120.0,
        Some(Season::Summer) => 45.0,
        Some(Season::Autumn) => 20.0,
        Some(Season::Winter) => 210.0,
        None => 200.0,
    };
    let shift = longitude.map(|lon| (lon / 180.0 * 30.0) as f32).unwrap_or(0.0);
    (base + shift).rem_euclid(360.0)
}

fn rotation_for_orientation(orientation: Option<u16>) -> f32 {
    match orientation {
        Some(3) | Some(4) => 180.0,
        Some(5) | Some(6) => 90.0,
        Some(7) | Some(8) => 270.0,
        _ => 0.0,
    }
}

fn speed_for(time_of_day: Option<TimeOfDay>) -> f32 {
    match time_of_day {
        Some(TimeOfDay::Dawn) | Some(TimeOfDay::Dusk) => 0.8,
        Some(TimeOfDay::Day) => 1.2,
        Some(TimeOfDay::Night) => 0.5,
        None => 1.0,
    }
}

fn motion_blur_for_iso(iso: Option<u32>) -> f32 {
    iso.map(|iso| remap_clamped(iso as f32, 100.0, 3200.0, 0.0, 0.8))
        .unwrap_or(0.0)
}

/// Map a metadata record to render parameters.
pub fn map_metadata(metadata: &ImageMetadata, rng: &mut StdRng) -> RenderParameters {
    let flash = metadata
        .flash
        .unwrap_or_else(|| rng.random_bool(UNKNOWN_FLASH_PROBABILITY));
    let dedicated_camera = metadata
        .phone_type
        .as_deref()
        .is_some_and(|p| p.contains("Camera") || p.contains("DSLR"));

    RenderParameters {
        pattern: pattern_for_time(metadata.hour(), metadata.time_of_day),
        shape: shape_for_lens(metadata.lens_type.as_deref(), rng),
        density: metadata
            .iso
            .map(|iso| density_for_iso(iso as f32))
            .unwrap_or(0.5),
        flow_intensity: metadata.aperture.map(flow_for_aperture).unwrap_or(0.5),
        particle_count: particles_for_dimensions(metadata.width, metadata.height),
        base_hue: hue_for(metadata.season, metadata.gps.map(|g| g.longitude)),
        brightness: if flash { 1.0 } else { 0.8 },
        tint: Tint::NONE,
        rotation: rotation_for_orientation(metadata.orientation),
        scale: if dedicated_camera { 1.2 } else { 1.0 },
        zoom: 1.0,
        speed: speed_for(metadata.time_of_day),
        motion_blur: motion_blur_for_iso(metadata.iso),
        seed: rng.random(),
    }
}
