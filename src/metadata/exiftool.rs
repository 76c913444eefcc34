//! `exiftool` wrapper used by the metadata service.
//!
//! Runs `exiftool -json -n <file>` and reshapes the first JSON object into
//! the service response. With `-n` exiftool prints numeric values: signed
//! decimal GPS, the raw flash bit field, numeric orientation.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use super::exif::{device_name, parse_exif_datetime};
use super::{GpsCoordinates, ImageMetadata, Season, TimeOfDay, classify_focal_length, classify_lens};
use crate::error::GlyphError;

/// Body of a successful `POST /api/extract-metadata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub metadata: ImageMetadata,
    /// Everything exiftool reported, untouched
    #[serde(default)]
    pub raw_metadata: Value,
}

/// Run exiftool on a file and return its first JSON object.
pub async fn run(binary: &str, file: &Path) -> Result<Value, GlyphError> {
    let output = tokio::process::Command::new(binary)
        .args(["-json", "-n"])
        .arg(file)
        .output()
        .await
        .map_err(|e| GlyphError::Extraction(format!("failed to run {}: {}", binary, e)))?;

    if !output.status.success() {
        return Err(GlyphError::Extraction(format!(
            "{} failed for '{}': {}",
            binary,
            file.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let parsed: Vec<Value> = serde_json::from_slice(&output.stdout)
        .map_err(|e| GlyphError::Extraction(format!("{} json parse failed: {}", binary, e)))?;
    parsed
        .into_iter()
        .next()
        .ok_or_else(|| GlyphError::Extraction(format!("{} returned no records", binary)))
}

fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn number(raw: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match raw.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Reshape exiftool output into the service response.
pub fn reshape(raw: Value) -> ExtractResponse {
    let lens = text(&raw, &["LensModel", "LensID", "Lens"]);
    let lens_type = lens
        .as_deref()
        .and_then(classify_lens)
        .or_else(|| number(&raw, &["FocalLengthIn35mmFormat"]).and_then(classify_focal_length))
        .map(String::from);

    let captured = text(&raw, &["DateTimeOriginal", "CreateDate", "ModifyDate"])
        .as_deref()
        .and_then(|s| parse_exif_datetime(s.get(..19).unwrap_or(s)));

    let gps = match (number(&raw, &["GPSLatitude"]), number(&raw, &["GPSLongitude"])) {
        (Some(latitude), Some(longitude)) => Some(GpsCoordinates { latitude, longitude }),
        _ => None,
    };
    let southern = gps.is_some_and(|g| g.latitude < 0.0);

    let metadata = ImageMetadata {
        phone_type: device_name(text(&raw, &["Make"]), text(&raw, &["Model"])),
        lens_type,
        lens,
        iso: number(&raw, &["ISO"]).map(|v| v.round() as u32),
        aperture: number(&raw, &["FNumber", "Aperture"]).map(|v| v as f32),
        flash: number(&raw, &["Flash"]).map(|v| (v as u32) & 1 == 1),
        orientation: number(&raw, &["Orientation"]).map(|v| v as u16),
        date: captured.map(|dt| dt.date()),
        time: captured.map(|dt| dt.time()),
        time_of_day: captured.map(|dt| TimeOfDay::from_hour(dt.hour())),
        season: captured.map(|dt| Season::from_month(dt.month(), southern)),
        gps,
        width: number(&raw, &["ImageWidth", "ExifImageWidth"]).map(|v| v as u32),
        height: number(&raw, &["ImageHeight", "ExifImageHeight"]).map(|v| v as u32),
    };

    ExtractResponse {
        metadata,
        raw_metadata: raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_reshape_iphone_record() {
        let raw = json!({
            "SourceFile": "/tmp/upload.jpg",
            "Make": "Apple",
            "Model": "iPhone 14 Pro",
            "LensModel": "iPhone 14 Pro back triple camera 2.22mm f/2.2",
            "FocalLengthIn35mmFormat": 13,
            "ISO": 125,
            "FNumber": 2.2,
            "Flash": 16,
            "Orientation": 6,
            "DateTimeOriginal": "2023:06:15 21:05:12",
            "GPSLatitude": -33.8568,
            "GPSLongitude": 151.2153,
            "ImageWidth": 4032,
            "ImageHeight": 3024
        });
        let response = reshape(raw);
        let m = &response.metadata;
        assert_eq!(m.phone_type.as_deref(), Some("Apple iPhone 14 Pro"));
        assert_eq!(m.lens_type.as_deref(), Some("Ultra Wide"));
        assert_eq!(m.iso, Some(125));
        assert_eq!(m.flash, Some(false));
        assert_eq!(m.orientation, Some(6));
        assert_eq!(m.time_of_day, Some(TimeOfDay::Night));
        assert_eq!(m.season, Some(Season::Winter));
        assert_eq!(m.width, Some(4032));
        assert_eq!(response.raw_metadata["SourceFile"], "/tmp/upload.jpg");
    }

    #[test]
    fn test_reshape_subsecond_timestamp() {
        let response = reshape(json!({
            "DateTimeOriginal": "2023:06:15 14:30:00.123+02:00",
            "Flash": 25
        }));
        assert_eq!(response.metadata.time_of_day, Some(TimeOfDay::Day));
        assert_eq!(response.metadata.flash, Some(true));
    }

    #[test]
    fn test_response_shape() {
        let body = serde_json::to_value(reshape(json!({ "ISO": 400 }))).unwrap();
        for key in [
            "phoneType",
            "lensType",
            "lens",
            "iso",
            "aperture",
            "flash",
            "orientation",
            "date",
            "time",
            "timeOfDay",
            "gps",
            "width",
            "height",
            "rawMetadata",
        ] {
            assert!(body.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(body["iso"], 400);
        assert!(body["gps"].is_null());
    }

    #[test]
    fn test_response_roundtrips_through_client_type() {
        let response = reshape(json!({ "Make": "Google", "Model": "Pixel 7" }));
        let body = serde_json::to_string(&response).unwrap();
        let parsed: ExtractResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.metadata.phone_type.as_deref(), Some("Google Pixel 7"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_error() {
        let result = run("definitely-not-exiftool-binary", Path::new("/tmp/none.jpg")).await;
        assert!(result.is_err());
    }
}
