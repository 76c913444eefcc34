//! # Shutterglyph - Generative Patterns from Photo Metadata
//!
//! Shutterglyph reads how a photo was taken (device, lens, ISO, aperture,
//! flash, time, place) and turns it into the parameters of an animated
//! generative pattern. It provides:
//!
//! - **Extraction**: an ordered cascade (metadata service, pixel analysis,
//!   embedded EXIF, heuristics) folded first-writer-wins
//! - **Mapping**: metadata → render parameters, reproducible from a seed
//! - **Rendering**: five animated scenes on an RGBA surface, PNG export
//! - **Controls**: click/drag selectors and knobs over a parameter store
//! - **Service**: an HTTP endpoint wrapping `exiftool`
//!
//! ## Quick Start
//!
//! ```no_run
//! use rand::{SeedableRng, rngs::StdRng};
//! use shutterglyph::{
//!     config::CanvasConfig,
//!     metadata::{Extractor, UploadedImage},
//!     params::map_metadata,
//!     render::Renderer,
//! };
//!
//! # async fn example() -> Result<(), shutterglyph::GlyphError> {
//! let bytes = std::fs::read("IMG_20230615_143000.jpg")?;
//! let upload = UploadedImage::decode("IMG_20230615_143000.jpg", bytes)?;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let metadata = Extractor::offline().extract(&upload, &mut rng).await;
//! let params = map_metadata(&metadata, &mut rng);
//!
//! let mut renderer = Renderer::new(CanvasConfig::STUDIO, &params, None);
//! for _ in 0..60 {
//!     renderer.frame(&params);
//! }
//! std::fs::write("pattern.png", renderer.export_png()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`metadata`] | Metadata record and the extraction cascade |
//! | [`params`] | Render parameters, mapping rules, parameter store |
//! | [`art`] | Pattern scenes |
//! | [`canvas`] | Drawing surface and primitives |
//! | [`render`] | Frame loop, failure fallback, export |
//! | [`controls`] | Pointer-driven controls |
//! | [`session`] | Upload generations |
//! | [`server`] | HTTP metadata service |
//! | [`shader`] | Noise, interpolation and color primitives |
//! | [`config`] | Canvas presets |
//! | [`error`] | Error types |

pub mod art;
pub mod canvas;
pub mod config;
pub mod controls;
pub mod error;
pub mod metadata;
pub mod params;
pub mod render;
pub mod server;
pub mod session;
pub mod shader;

// Re-exports for convenience
pub use config::CanvasConfig;
pub use error::GlyphError;
pub use metadata::ImageMetadata;
pub use params::RenderParameters;
