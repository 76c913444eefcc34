//! # Shader Primitives
//!
//! Small building blocks shared by the pattern scenes. These mirror common
//! fragment-shader operations and compose freely.
//!
//! ## Categories
//!
//! - [`noise`]: Integer hashes, seeded gradient noise, fractal Brownian motion
//! - [`blend`]: Linear and inverse interpolation, angular interpolation
//! - [`transform`]: Rotation, polar conversion, polygon and star outlines
//! - [`adjust`]: Clamping, range remapping, rounding
//! - [`color`]: HSL conversion and tinting
//!
//! ## Example
//!
//! ```rust
//! use shutterglyph::shader::*;
//!
//! let perlin = Perlin::new(7);
//! let n = perlin.noise3(0.3, 0.7, 1.5);
//! let rgb = hsl_to_rgb(200.0 + n * 40.0, 0.7, 0.5);
//! assert!(rgb.iter().all(|c| (0.0..=1.0).contains(c)));
//! ```

pub mod adjust;
pub mod blend;
pub mod color;
pub mod noise;
pub mod transform;

pub use adjust::*;
pub use blend::*;
pub use color::*;
pub use noise::*;
pub use transform::*;
