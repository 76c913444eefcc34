//! Stage 2: guesses from pixel statistics.
//!
//! Samples every `stride`-th pixel on every `stride`-th row and computes the
//! mean luma ("brightness") and the luma variance ("color variance"):
//!
//! ```text
//! luma      = 0.299 r + 0.587 g + 0.114 b
//! mean      = Σ luma / n
//! variance  = Σ luma² / n - mean²
//! ```
//!
//! | Statistic | Rule | Field |
//! |-----------|------|-------|
//! | mean ≥ 140 | day | `timeOfDay` |
//! | mean ≤ 60 | night | `timeOfDay` |
//! | mean < 40 | flash likely fired | `flash` |
//! | mean > 170 | no flash | `flash` |
//! | variance | bucketed, see [`iso_bucket`] | `iso` |
//! | aspect 3:2 | dedicated camera | `phoneType` |
//! | aspect 16:9 | smartphone | `phoneType` |

use async_trait::async_trait;
use image::RgbImage;
use rand::rngs::StdRng;
use rayon::prelude::*;

use super::heuristics::SizeBucket;
use super::{ExtractionStage, ImageMetadata, TimeOfDay, UploadedImage};

/// Default sampling stride in both axes.
pub const SAMPLE_STRIDE: u32 = 10;

/// Brightness/variance summary of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStats {
    /// Mean luma, 0–255
    pub mean_brightness: f32,
    /// Luma variance
    pub color_variance: f32,
    /// Number of pixels sampled
    pub samples: u64,
}

/// Sample an image. Returns `None` for an empty image.
pub fn analyze(img: &RgbImage, stride: u32) -> Option<PixelStats> {
    let (width, height) = img.dimensions();
    let stride = stride.max(1) as usize;
    if width == 0 || height == 0 {
        return None;
    }

    let rows: Vec<u32> = (0..height).step_by(stride).collect();
    let (sum, sum_sq, count) = rows
        .par_iter()
        .map(|&y| {
            let mut sum = 0.0f64;
            let mut sum_sq = 0.0f64;
            let mut count = 0u64;
            for x in (0..width).step_by(stride) {
                let p = img.get_pixel(x, y);
                let luma = 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
                sum += luma;
                sum_sq += luma * luma;
                count += 1;
            }
            (sum, sum_sq, count)
        })
        .reduce(|| (0.0, 0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));

    if count == 0 {
        return None;
    }
    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
    Some(PixelStats {
        mean_brightness: mean as f32,
        color_variance: variance as f32,
        samples: count,
    })
}

/// Map luma variance to an ISO bucket: noisier images suggest higher ISO.
pub fn iso_bucket(variance: f32) -> u32 {
    match variance {
        v if v < 400.0 => 100,
        v if v < 1200.0 => 200,
        v if v < 2500.0 => 400,
        v if v < 4000.0 => 800,
        _ => 1600,
    }
}

/// Coarse device class for unambiguous aspect ratios.
///
/// 4:3 is shared by phones and compacts, so it yields nothing here.
pub fn device_from_aspect(width: u32, height: u32, file_size: u64) -> Option<&'static str> {
    if width == 0 || height == 0 {
        return None;
    }
    let ratio = width.max(height) as f32 / width.min(height) as f32;
    if (ratio - 1.5).abs() < 0.03 {
        if SizeBucket::from_bytes(file_size) == Some(SizeBucket::Huge) {
            Some("Mirrorless Camera")
        } else {
            Some("Compact Camera")
        }
    } else if (ratio - 16.0 / 9.0).abs() < 0.03 {
        Some("Smartphone")
    } else {
        None
    }
}

/// Pixel analysis stage.
pub struct PixelStage {
    stride: u32,
}

impl Default for PixelStage {
    fn default() -> Self {
        Self { stride: SAMPLE_STRIDE }
    }
}

impl PixelStage {
    /// Synchronous core of the stage.
    pub fn guess(&self, image: &UploadedImage) -> ImageMetadata {
        let Some(pixels) = image.pixels.as_ref() else {
            return ImageMetadata::default();
        };
        let (width, height) = pixels.dimensions();
        let mut guess = ImageMetadata {
            width: Some(width),
            height: Some(height),
            phone_type: device_from_aspect(width, height, image.file_size).map(String::from),
            ..Default::default()
        };

        if let Some(stats) = analyze(pixels, self.stride) {
            guess.time_of_day = match stats.mean_brightness {
                b if b >= 140.0 => Some(TimeOfDay::Day),
                b if b <= 60.0 => Some(TimeOfDay::Night),
                _ => None,
            };
            guess.flash = match stats.mean_brightness {
                b if b < 40.0 => Some(true),
                b if b > 170.0 => Some(false),
                _ => None,
            };
            guess.iso = Some(iso_bucket(stats.color_variance));
        }
        guess
    }
}

#[async_trait]
impl ExtractionStage for PixelStage {
    fn name(&self) -> &'static str {
        "pixels"
    }

    async fn extract(
        &self,
        image: &UploadedImage,
        _known: &ImageMetadata,
        _rng: &mut StdRng,
    ) -> ImageMetadata {
        self.guess(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, v: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([v, v, v]))
    }

    #[test]
    fn test_analyze_solid() {
        let stats = analyze(&solid(100, 50, 200), 10).unwrap();
        assert!((stats.mean_brightness - 200.0).abs() < 0.5);
        assert!(stats.color_variance < 1.0);
        assert_eq!(stats.samples, 10 * 5);
    }

    #[test]
    fn test_analyze_empty() {
        assert!(analyze(&RgbImage::new(0, 0), 10).is_none());
    }

    #[test]
    fn test_checkerboard_has_high_variance() {
        let img = RgbImage::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let stats = analyze(&img, 1).unwrap();
        assert!(stats.color_variance > 10_000.0);
        assert_eq!(iso_bucket(stats.color_variance), 1600);
    }

    #[test]
    fn test_bright_image_is_day_without_flash() {
        let upload = UploadedImage::new("a.jpg", 2_000_000).with_pixels(solid(400, 300, 220));
        let guess = PixelStage::default().guess(&upload);
        assert_eq!(guess.time_of_day, Some(TimeOfDay::Day));
        assert_eq!(guess.flash, Some(false));
        assert_eq!(guess.iso, Some(100));
        assert_eq!(guess.width, Some(400));
        // 4:3 is ambiguous
        assert_eq!(guess.phone_type, None);
    }

    #[test]
    fn test_dark_image_is_night_with_flash() {
        let upload = UploadedImage::new("a.jpg", 2_000_000).with_pixels(solid(160, 90, 10));
        let guess = PixelStage::default().guess(&upload);
        assert_eq!(guess.time_of_day, Some(TimeOfDay::Night));
        assert_eq!(guess.flash, Some(true));
        assert_eq!(guess.phone_type.as_deref(), Some("Smartphone"));
    }

    #[test]
    fn test_device_from_aspect() {
        assert_eq!(device_from_aspect(6000, 4000, 25_000_000), Some("Mirrorless Camera"));
        assert_eq!(device_from_aspect(3000, 2000, 3_000_000), Some("Compact Camera"));
        assert_eq!(device_from_aspect(4000, 3000, 7_200_000), None);
    }

    #[test]
    fn test_no_pixels_no_guess() {
        let guess = PixelStage::default().guess(&UploadedImage::new("a.jpg", 10));
        assert_eq!(guess, ImageMetadata::default());
    }
}
