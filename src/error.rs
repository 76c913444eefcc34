//! # Error Types
//!
//! This module defines error types used throughout the shutterglyph library.
//!
//! Extraction and per-frame rendering failures are normally recovered where
//! they happen (see [`crate::metadata`] and [`crate::render`]); these variants
//! surface only at the edges: the CLI, the HTTP handlers and export.

use thiserror::Error;

/// Main error type for shutterglyph operations
#[derive(Debug, Error)]
pub enum GlyphError {
    /// The selected file is not an image we can work with
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// A metadata extraction step failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A frame could not be drawn
    #[error("Render error: {0}")]
    Render(String),

    /// Snapshot export failed
    #[error("Export error: {0}")]
    Export(String),

    /// HTTP server error (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for GlyphError {
    fn from(e: image::ImageError) -> Self {
        GlyphError::Image(e.to_string())
    }
}
