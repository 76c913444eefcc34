//! Stage 3: embedded EXIF tags.
//!
//! Parsing runs on the blocking pool and is abandoned after [`EXIF_TIMEOUT`];
//! a timeout, a missing EXIF block or a parse error all contribute nothing.
//!
//! ## GPS
//!
//! EXIF stores coordinates as degree/minute/second rationals plus a
//! hemisphere letter:
//!
//! ```text
//! dd = deg + min / 60 + sec / 3600      (negated for 'S' and 'W')
//! ```

use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike};
use exif::{Exif, In, Tag, Value};
use rand::rngs::StdRng;
use std::io::Cursor;
use std::time::Duration;

use super::{
    ExtractionStage, GpsCoordinates, ImageMetadata, TimeOfDay, UploadedImage, classify_focal_length,
    classify_lens,
};
use crate::error::GlyphError;

/// Upper bound on EXIF parsing time.
pub const EXIF_TIMEOUT: Duration = Duration::from_secs(3);

/// Convert degrees/minutes/seconds to signed decimal degrees.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, hemisphere: char) -> f64 {
    let dd = degrees + minutes / 60.0 + seconds / 3600.0;
    match hemisphere.to_ascii_uppercase() {
        'S' | 'W' => -dd,
        _ => dd,
    }
}

/// Parse an EXIF timestamp ("2023:06:15 14:30:00").
pub fn parse_exif_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), "%Y:%m:%d %H:%M:%S").ok()
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_matches(char::from(0))
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

fn rationals(exif: &Exif, tag: Tag) -> Option<Vec<f64>> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(values) => Some(values.iter().map(|r| r.to_f64()).collect()),
        _ => None,
    }
}

fn coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let dms = rationals(exif, value_tag)?;
    if dms.len() < 3 || dms.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let hemisphere = ascii(exif, ref_tag)
        .and_then(|s| s.chars().next())
        .unwrap_or('N');
    Some(dms_to_decimal(dms[0], dms[1], dms[2], hemisphere))
}

/// Join make and model, avoiding "Canon Canon EOS R5".
pub fn device_name(make: Option<String>, model: Option<String>) -> Option<String> {
    match (make, model) {
        (Some(make), Some(model)) if model.to_lowercase().starts_with(&make.to_lowercase()) => {
            Some(model)
        }
        (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
        (make, model) => make.or(model),
    }
}

/// Read the tags we care about from a JPEG/TIFF/HEIF/PNG/WebP container.
pub fn read_tags(bytes: &[u8]) -> Result<ImageMetadata, GlyphError> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .map_err(|e| GlyphError::Extraction(format!("no readable EXIF: {}", e)))?;

    let lens = ascii(&exif, Tag::LensModel);
    let lens_type = lens
        .as_deref()
        .and_then(classify_lens)
        .or_else(|| {
            uint(&exif, Tag::FocalLengthIn35mmFilm).and_then(|mm| classify_focal_length(mm as f64))
        })
        .map(String::from);

    let captured = ascii(&exif, Tag::DateTimeOriginal)
        .or_else(|| ascii(&exif, Tag::DateTime))
        .as_deref()
        .and_then(parse_exif_datetime);

    let gps = match (
        coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef),
        coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef),
    ) {
        (Some(latitude), Some(longitude)) => Some(GpsCoordinates { latitude, longitude }),
        _ => None,
    };

    Ok(ImageMetadata {
        phone_type: device_name(ascii(&exif, Tag::Make), ascii(&exif, Tag::Model)),
        lens_type,
        lens,
        iso: uint(&exif, Tag::PhotographicSensitivity),
        aperture: rationals(&exif, Tag::FNumber)
            .and_then(|v| v.first().copied())
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| f as f32),
        flash: uint(&exif, Tag::Flash).map(|bits| bits & 1 == 1),
        orientation: uint(&exif, Tag::Orientation).map(|o| o as u16),
        date: captured.map(|dt| dt.date()),
        time: captured.map(|dt| dt.time()),
        time_of_day: captured.map(|dt| TimeOfDay::from_hour(dt.hour())),
        season: None,
        gps,
        width: uint(&exif, Tag::PixelXDimension),
        height: uint(&exif, Tag::PixelYDimension),
    })
}

/// EXIF stage with a bounded wait.
pub struct ExifStage {
    timeout: Duration,
}

impl Default for ExifStage {
    fn default() -> Self {
        Self { timeout: EXIF_TIMEOUT }
    }
}

#[async_trait]
impl ExtractionStage for ExifStage {
    fn name(&self) -> &'static str {
        "exif"
    }

    async fn extract(
        &self,
        image: &UploadedImage,
        _known: &ImageMetadata,
        _rng: &mut StdRng,
    ) -> ImageMetadata {
        if image.bytes.is_empty() {
            return ImageMetadata::default();
        }
        let bytes = image.bytes.clone();
        let parse = tokio::task::spawn_blocking(move || read_tags(&bytes));

        match tokio::time::timeout(self.timeout, parse).await {
            Ok(Ok(Ok(metadata))) => metadata,
            Ok(Ok(Err(e))) => {
                tracing::debug!(error = %e, "[extract] exif stage skipped");
                ImageMetadata::default()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "[extract] exif task failed");
                ImageMetadata::default()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "[extract] exif parsing timed out"
                );
                ImageMetadata::default()
            }
        }
    }
}
