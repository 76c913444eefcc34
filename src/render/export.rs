//! PNG export of the current frame.
//!
//! The frame is copied to an offscreen buffer `scale` times larger
//! (Lanczos3) before encoding. No retry on failure.

use chrono::NaiveDateTime;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::io::Cursor;
use std::path::Path;

use crate::error::GlyphError;

/// Copy to an offscreen buffer `scale` times the size.
pub fn upscale(img: &RgbaImage, scale: u32) -> RgbaImage {
    if scale <= 1 {
        return img.clone();
    }
    imageops::resize(img, img.width() * scale, img.height() * scale, FilterType::Lanczos3)
}

/// Encode as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, GlyphError> {
    let mut png_bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)?;
    Ok(png_bytes)
}

/// Upscale and encode.
pub fn export_png(img: &RgbaImage, scale: u32) -> Result<Vec<u8>, GlyphError> {
    encode_png(&upscale(img, scale))
}

/// Upscale, encode and write to `path`.
pub fn save_png(img: &RgbaImage, scale: u32, path: &Path) -> Result<(), GlyphError> {
    let bytes = export_png(img, scale)?;
    std::fs::write(path, &bytes)
        .map_err(|e| GlyphError::Export(format!("failed to write {}: {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "[export] saved");
    Ok(())
}

/// Default download name for an export made at `at`.
pub fn export_file_name(at: NaiveDateTime) -> String {
    format!("shutterglyph-{}.png", at.format("%Y%m%d-%H%M%S"))
}
