//! # Image Metadata
//!
//! Best-effort capture metadata for an uploaded photo. Nothing here is a
//! measurement: every field is optional and may come from the local metadata
//! service, pixel statistics, embedded EXIF tags or plain guessing.
//!
//! ## Extraction Cascade
//!
//! | Order | Stage | Module |
//! |-------|-------|--------|
//! | 1 | Local metadata service (HTTP) | [`service`] |
//! | 2 | Pixel brightness/variance analysis | [`pixels`] |
//! | 3 | Embedded EXIF tags (with timeout) | [`exif`] |
//! | 4 | Filename, file size and random fallbacks | [`heuristics`] |
//!
//! Stages are folded left to right with [`ImageMetadata::fill_missing`]: a
//! field set by an earlier stage is never replaced by a later one.
//!
//! ## Example
//!
//! ```no_run
//! use rand::{SeedableRng, rngs::StdRng};
//! use shutterglyph::metadata::{Extractor, UploadedImage};
//!
//! # async fn example() -> Result<(), shutterglyph::GlyphError> {
//! let bytes = std::fs::read("IMG_20230615_143000.jpg")?;
//! let upload = UploadedImage::decode("IMG_20230615_143000.jpg", bytes)?;
//! let mut rng = StdRng::seed_from_u64(7);
//! let metadata = Extractor::offline().extract(&upload, &mut rng).await;
//! println!("{:?}", metadata.date);
//! # Ok(())
//! # }
//! ```

pub mod exif;
pub mod exiftool;
pub mod heuristics;
pub mod pipeline;
pub mod pixels;
pub mod service;

pub use pipeline::{ExtractionStage, Extractor};

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::GlyphError;

/// Coarse time of day derived from the capture hour or scene brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl TimeOfDay {
    /// Dawn 05–06, day 07–16, dusk 17–19, night otherwise.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=6 => TimeOfDay::Dawn,
            7..=16 => TimeOfDay::Day,
            17..=19 => TimeOfDay::Dusk,
            _ => TimeOfDay::Night,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, TimeOfDay::Night | TimeOfDay::Dusk)
    }
}

/// Meteorological season of the capture date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season for a month (1–12); flipped for the southern hemisphere.
    pub fn from_month(month: u32, southern: bool) -> Self {
        let northern = match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        };
        if !southern {
            return northern;
        }
        match northern {
            Season::Spring => Season::Autumn,
            Season::Summer => Season::Winter,
            Season::Autumn => Season::Spring,
            Season::Winter => Season::Summer,
        }
    }
}

/// Decimal-degree coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Per-image guess of capture conditions.
///
/// Serialized with the camelCase keys of the metadata service response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Device identification ("Apple iPhone 14 Pro", "Flagship Smartphone")
    pub phone_type: Option<String>,
    /// Lens classification: "Wide", "Ultra Wide", "Telephoto" or "Macro"
    pub lens_type: Option<String>,
    /// Lens model text as reported by the device
    pub lens: Option<String>,
    pub iso: Option<u32>,
    /// F-number
    pub aperture: Option<f32>,
    pub flash: Option<bool>,
    /// EXIF orientation code (1–8)
    pub orientation: Option<u16>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub time_of_day: Option<TimeOfDay>,
    pub season: Option<Season>,
    pub gps: Option<GpsCoordinates>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageMetadata {
    /// Fill every unset field from `later`, leaving set fields untouched.
    ///
    /// Returns how many fields were filled. The destructuring below is
    /// exhaustive, so adding a field without merging it fails to compile.
    pub fn fill_missing(&mut self, later: ImageMetadata) -> usize {
        let ImageMetadata {
            phone_type,
            lens_type,
            lens,
            iso,
            aperture,
            flash,
            orientation,
            date,
            time,
            time_of_day,
            season,
            gps,
            width,
            height,
        } = later;

        let mut filled = 0;
        fill(&mut self.phone_type, phone_type, &mut filled);
        fill(&mut self.lens_type, lens_type, &mut filled);
        fill(&mut self.lens, lens, &mut filled);
        fill(&mut self.iso, iso, &mut filled);
        fill(&mut self.aperture, aperture, &mut filled);
        fill(&mut self.flash, flash, &mut filled);
        fill(&mut self.orientation, orientation, &mut filled);
        fill(&mut self.date, date, &mut filled);
        fill(&mut self.time, time, &mut filled);
        fill(&mut self.time_of_day, time_of_day, &mut filled);
        fill(&mut self.season, season, &mut filled);
        fill(&mut self.gps, gps, &mut filled);
        fill(&mut self.width, width, &mut filled);
        fill(&mut self.height, height, &mut filled);
        filled
    }

    /// Number of fields that hold a value.
    pub fn known_fields(&self) -> usize {
        [
            self.phone_type.is_some(),
            self.lens_type.is_some(),
            self.lens.is_some(),
            self.iso.is_some(),
            self.aperture.is_some(),
            self.flash.is_some(),
            self.orientation.is_some(),
            self.date.is_some(),
            self.time.is_some(),
            self.time_of_day.is_some(),
            self.season.is_some(),
            self.gps.is_some(),
            self.width.is_some(),
            self.height.is_some(),
        ]
        .iter()
        .filter(|known| **known)
        .count()
    }

    /// Capture hour, if a time is known.
    pub fn hour(&self) -> Option<u32> {
        self.time.map(|t| t.hour())
    }

    /// Capture month, if a date is known.
    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>, filled: &mut usize) {
    if slot.is_none() && value.is_some() {
        *slot = value;
        *filled += 1;
    }
}

/// Classify free-form lens text into one of the lens classes.
pub fn classify_lens(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    if lower.contains("ultra") {
        Some("Ultra Wide")
    } else if lower.contains("macro") {
        Some("Macro")
    } else if lower.contains("tele") {
        Some("Telephoto")
    } else if lower.contains("wide") || lower.contains("main") {
        Some("Wide")
    } else {
        None
    }
}

/// Classify a 35mm-equivalent focal length.
pub fn classify_focal_length(mm: f64) -> Option<&'static str> {
    match mm {
        f if !f.is_finite() || f <= 0.0 => None,
        f if f < 20.0 => Some("Ultra Wide"),
        f if f < 70.0 => Some("Wide"),
        _ => Some("Telephoto"),
    }
}

/// An uploaded photo as seen by the extraction stages.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Original file name as selected by the user
    pub file_name: String,
    /// File size in bytes (may differ from `bytes.len()` for synthetic inputs)
    pub file_size: u64,
    /// Raw file contents
    pub bytes: Arc<Vec<u8>>,
    /// Decoded pixels, if decoding succeeded
    pub pixels: Option<Arc<RgbImage>>,
    /// When the upload was received; anchors fabricated dates
    pub received_at: NaiveDateTime,
}

/// File extensions accepted by the file picker.
pub const ACCEPTED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "tif", "tiff", "bmp", "gif"];

impl UploadedImage {
    /// Create an upload without pixel data.
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
            bytes: Arc::new(Vec::new()),
            pixels: None,
            received_at: Local::now().naive_local(),
        }
    }

    /// Validate the file name and decode the bytes.
    ///
    /// Rejects files the picker would refuse (unknown extension) and files
    /// that do not decode as an image.
    pub fn decode(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, GlyphError> {
        let file_name = file_name.into();
        validate_file_name(&file_name)?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| GlyphError::InvalidFile(format!("{}: {}", file_name, e)))?;
        let file_size = bytes.len() as u64;
        Ok(Self::new(file_name, file_size)
            .with_bytes(bytes)
            .with_pixels(img.to_rgb8()))
    }

    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = Arc::new(bytes);
        self
    }

    pub fn with_pixels(mut self, pixels: RgbImage) -> Self {
        self.pixels = Some(Arc::new(pixels));
        self
    }

    pub fn received_at(mut self, at: NaiveDateTime) -> Self {
        self.received_at = at;
        self
    }

    /// Pixel dimensions of the decoded image.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.pixels.as_ref().map(|p| p.dimensions())
    }
}

/// Reject file names whose extension is not an accepted image type.
pub fn validate_file_name(file_name: &str) -> Result<(), GlyphError> {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(GlyphError::InvalidFile(format!(
            "'{}' is not a supported image (expected one of: {})",
            file_name,
            ACCEPTED_EXTENSIONS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full() -> ImageMetadata {
        ImageMetadata {
            phone_type: Some("Apple iPhone 14 Pro".into()),
            lens_type: Some("Wide".into()),
            lens: Some("iPhone 14 Pro back camera 6.86mm f/1.78".into()),
            iso: Some(64),
            aperture: Some(1.78),
            flash: Some(false),
            orientation: Some(6),
            date: NaiveDate::from_ymd_opt(2023, 6, 15),
            time: NaiveTime::from_hms_opt(14, 30, 0),
            time_of_day: Some(TimeOfDay::Day),
            season: Some(Season::Summer),
            gps: Some(GpsCoordinates { latitude: 40.6776, longitude: -73.9442 }),
            width: Some(4032),
            height: Some(3024),
        }
    }

    #[test]
    fn test_fill_missing_never_overwrites() {
        let first = full();
        let mut second = ImageMetadata::default();
        second.iso = Some(3200);
        second.phone_type = Some("Other".into());
        second.gps = Some(GpsCoordinates { latitude: 0.0, longitude: 0.0 });

        let mut merged = first.clone();
        let filled = merged.fill_missing(second);
        assert_eq!(filled, 0);
        assert_eq!(merged, first);
    }

    #[test]
    fn test_fill_missing_fills_each_field_independently() {
        let mut partial = ImageMetadata {
            iso: Some(100),
            ..Default::default()
        };
        let filled = partial.fill_missing(full());
        assert_eq!(filled, 13);
        assert_eq!(partial.iso, Some(100));
        assert_eq!(partial.aperture, Some(1.78));
        assert_eq!(partial.known_fields(), 14);
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(full()).unwrap();
        assert_eq!(json["phoneType"], "Apple iPhone 14 Pro");
        assert_eq!(json["lensType"], "Wide");
        assert_eq!(json["timeOfDay"], "day");
        assert_eq!(json["date"], "2023-06-15");
        assert_eq!(json["time"], "14:30:00");
        assert_eq!(json["gps"]["latitude"], 40.6776);
    }

    #[test]
    fn test_time_of_day_from_hour() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(14), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Dusk);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn test_season_flips_south() {
        assert_eq!(Season::from_month(7, false), Season::Summer);
        assert_eq!(Season::from_month(7, true), Season::Winter);
        assert_eq!(Season::from_month(12, false), Season::Winter);
        assert_eq!(Season::from_month(4, true), Season::Autumn);
    }

    #[test]
    fn test_classify_lens() {
        assert_eq!(classify_lens("iPhone 13 back ultra wide camera"), Some("Ultra Wide"));
        assert_eq!(classify_lens("Telephoto 3x"), Some("Telephoto"));
        assert_eq!(classify_lens("EF100mm f/2.8L Macro IS USM"), Some("Macro"));
        assert_eq!(classify_lens("RF24-105mm"), None);
        assert_eq!(classify_focal_length(13.0), Some("Ultra Wide"));
        assert_eq!(classify_focal_length(26.0), Some("Wide"));
        assert_eq!(classify_focal_length(77.0), Some("Telephoto"));
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("IMG_0001.JPG").is_ok());
        assert!(validate_file_name("notes.txt").is_err());
        assert!(validate_file_name("no_extension").is_err());
    }
}
