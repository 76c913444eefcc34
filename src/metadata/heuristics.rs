//! Stage 4: filename, file size and randomized fallbacks.
//!
//! This is the last stage, so after it every field except `gps` holds a
//! value. Guesses that depend on earlier answers (aperture given the lens,
//! time of day given the time, season given date and hemisphere) read the
//! record accumulated so far.
//!
//! ## Filename Conventions
//!
//! | Example | Source |
//! |---------|--------|
//! | `IMG_20230615_143000.jpg` | Android camera |
//! | `PXL_20230615_143000123.jpg` | Google Pixel |
//! | `20230615_143000.jpg` | Samsung |
//! | `Screenshot_2023-06-15-14-30-00.png` | Android screenshot |
//! | `IMG-20230615-WA0001.jpg` | WhatsApp (date only) |
//!
//! ## Weighted Fallbacks
//!
//! | Field | Options | Weights |
//! |-------|---------|---------|
//! | lens type | Wide, Ultra Wide, Telephoto, Macro | 40/30/20/10 |
//! | device | iPhone, Samsung Galaxy, Google Pixel, Other Android | 45/30/15/10 |
//! | flash | fired | p = 0.15 |

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use std::path::Path;

use super::{ExtractionStage, ImageMetadata, Season, TimeOfDay, UploadedImage};

/// Lens classes and their fallback weights.
pub const LENS_CLASSES: [(&str, u32); 4] =
    [("Wide", 40), ("Ultra Wide", 30), ("Telephoto", 20), ("Macro", 10)];

/// Device classes and their fallback weights.
pub const DEVICE_CLASSES: [(&str, u32); 4] = [
    ("iPhone", 45),
    ("Samsung Galaxy", 30),
    ("Google Pixel", 15),
    ("Other Android", 10),
];

/// ISO values drawn uniformly when nothing else is known.
pub const ISO_VALUES: [u32; 7] = [50, 100, 200, 400, 800, 1600, 3200];

/// Probability that a fabricated record says the flash fired.
pub const FLASH_PROBABILITY: f64 = 0.15;

/// Pixel size assumed when the image could not be decoded (12 MP, 4:3).
pub const DEFAULT_DIMENSIONS: (u32, u32) = (4032, 3024);

/// File-size buckets used for device and lens guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    /// < 1.5 MB
    Small,
    /// < 4 MB
    Medium,
    /// < 10 MB
    Large,
    /// ≥ 10 MB
    Huge,
}

impl SizeBucket {
    /// Bucket for a file size; `None` when the size is unknown (0).
    pub fn from_bytes(size: u64) -> Option<Self> {
        match size {
            0 => None,
            s if s < 1_500_000 => Some(SizeBucket::Small),
            s if s < 4_000_000 => Some(SizeBucket::Medium),
            s if s < 10_000_000 => Some(SizeBucket::Large),
            _ => Some(SizeBucket::Huge),
        }
    }

    pub fn device_guess(self) -> &'static str {
        match self {
            SizeBucket::Small => "Older Smartphone",
            SizeBucket::Medium => "Smartphone",
            SizeBucket::Large => "Flagship Smartphone",
            SizeBucket::Huge => "Mirrorless Camera",
        }
    }

    /// Only the extremes say anything about the lens.
    pub fn lens_guess(self) -> Option<&'static str> {
        match self {
            SizeBucket::Small => Some("Wide"),
            SizeBucket::Huge => Some("Telephoto"),
            SizeBucket::Medium | SizeBucket::Large => None,
        }
    }
}

/// Capture timestamp recovered from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameTimestamp {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

fn parse_ymd(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 {
        return None;
    }
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    if !(1990..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_hms(digits: &str) -> Option<NaiveTime> {
    if digits.len() < 6 {
        return None;
    }
    let hour: u32 = digits[0..2].parse().ok()?;
    let minute: u32 = digits[2..4].parse().ok()?;
    let second: u32 = digits[4..6].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Recover a capture timestamp from common camera/app file names.
pub fn parse_filename_timestamp(file_name: &str) -> Option<FilenameTimestamp> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let groups: Vec<&str> = stem
        .split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .collect();

    // Compact forms: YYYYMMDD[_HHMMSS...] or YYYYMMDDHHMMSS
    for (i, group) in groups.iter().enumerate() {
        if group.len() == 14 {
            if let (Some(date), Some(time)) = (parse_ymd(&group[..8]), parse_hms(&group[8..])) {
                return Some(FilenameTimestamp { date, time: Some(time) });
            }
        }
        if let Some(date) = parse_ymd(group) {
            let time = groups.get(i + 1).and_then(|next| parse_hms(next));
            return Some(FilenameTimestamp { date, time });
        }
    }

    // Separated forms: YYYY-MM-DD[-HH-MM-SS]
    for (start, window) in groups.windows(3).enumerate() {
        let [y, m, d] = window else { continue };
        if y.len() != 4 || m.len() != 2 || d.len() != 2 {
            continue;
        }
        if let Some(date) = parse_ymd(&format!("{}{}{}", y, m, d)) {
            let time = match groups.get(start + 3..start + 6) {
                Some([hh, mm, ss]) if hh.len() == 2 && mm.len() == 2 && ss.len() == 2 => {
                    parse_hms(&format!("{}{}{}", hh, mm, ss))
                }
                _ => None,
            };
            return Some(FilenameTimestamp { date, time });
        }
    }
    None
}

/// Device hints carried by file name prefixes.
pub fn device_from_filename(file_name: &str) -> Option<&'static str> {
    let upper = file_name.to_uppercase();
    let stem = upper.split('.').next().unwrap_or(&upper);

    if stem.starts_with("PXL_") {
        return Some("Google Pixel");
    }
    if let Some(rest) = stem.strip_prefix("IMG_E").or_else(|| stem.strip_prefix("IMG_")) {
        if rest.len() == 4 && rest.chars().all(|c| c.is_ascii_digit()) {
            return Some("iPhone");
        }
    }
    if ["DSC_", "DSCN", "_DSC", "_MG_"].iter().any(|prefix| stem.starts_with(prefix)) {
        return Some("Dedicated Camera");
    }
    None
}

fn weighted_pick(options: &[(&'static str, u32)], rng: &mut StdRng) -> &'static str {
    match WeightedIndex::new(options.iter().map(|(_, w)| *w)) {
        Ok(dist) => options[dist.sample(rng)].0,
        Err(_) => options[0].0,
    }
}

/// Pick a lens class with the 40/30/20/10 weights.
pub fn random_lens_class(rng: &mut StdRng) -> &'static str {
    weighted_pick(&LENS_CLASSES, rng)
}

/// Aperture plausible for a lens class.
pub fn random_aperture(lens_type: Option<&str>, rng: &mut StdRng) -> f32 {
    let choices: &[f32] = match lens_type {
        Some("Ultra Wide") => &[2.2, 2.4],
        Some("Telephoto") => &[2.8, 4.0, 5.6],
        Some("Macro") => &[2.8, 5.6, 8.0],
        _ => &[1.5, 1.8, 2.0],
    };
    choices[rng.random_range(0..choices.len())]
}

/// Filename and size heuristics with random fallbacks.
pub struct HeuristicStage;

impl HeuristicStage {
    /// Synchronous core of the stage.
    pub fn guess(
        &self,
        image: &UploadedImage,
        known: &ImageMetadata,
        rng: &mut StdRng,
    ) -> ImageMetadata {
        let mut guess = known.clone();
        let bucket = SizeBucket::from_bytes(image.file_size);

        if let Some(stamp) = parse_filename_timestamp(&image.file_name) {
            guess.date.get_or_insert(stamp.date);
            if let Some(time) = stamp.time {
                guess.time.get_or_insert(time);
            }
        }

        if guess.phone_type.is_none() {
            let device = device_from_filename(&image.file_name)
                .or_else(|| bucket.map(SizeBucket::device_guess))
                .unwrap_or_else(|| weighted_pick(&DEVICE_CLASSES, rng));
            guess.phone_type = Some(device.to_string());
        }

        if guess.lens_type.is_none() {
            let lens = bucket
                .and_then(SizeBucket::lens_guess)
                .unwrap_or_else(|| random_lens_class(rng));
            guess.lens_type = Some(lens.to_string());
        }
        if guess.lens.is_none() {
            guess.lens = guess.lens_type.as_ref().map(|t| format!("{} Camera", t));
        }

        if guess.iso.is_none() {
            guess.iso = Some(ISO_VALUES[rng.random_range(0..ISO_VALUES.len())]);
        }
        if guess.aperture.is_none() {
            guess.aperture = Some(random_aperture(guess.lens_type.as_deref(), rng));
        }
        if guess.flash.is_none() {
            guess.flash = Some(rng.random_bool(FLASH_PROBABILITY));
        }
        guess.orientation.get_or_insert(1);

        if guess.date.is_none() {
            guess.date = Some(image.received_at.date());
        }
        if guess.time.is_none() {
            let (hour, minute) = (rng.random_range(0..24), rng.random_range(0..60));
            guess.time = NaiveTime::from_hms_opt(hour, minute, 0);
        }
        if guess.time_of_day.is_none() {
            guess.time_of_day = guess.time.map(|t| TimeOfDay::from_hour(t.hour()));
        }
        if guess.season.is_none() {
            let southern = guess.gps.is_some_and(|g| g.latitude < 0.0);
            guess.season = guess.date.map(|d| Season::from_month(d.month(), southern));
        }

        let (width, height) = image.dimensions().unwrap_or(DEFAULT_DIMENSIONS);
        guess.width.get_or_insert(width);
        guess.height.get_or_insert(height);
        guess
    }
}

#[async_trait]
impl ExtractionStage for HeuristicStage {
    fn name(&self) -> &'static str {
        "heuristics"
    }

    async fn extract(
        &self,
        image: &UploadedImage,
        known: &ImageMetadata,
        rng: &mut StdRng,
    ) -> ImageMetadata {
        self.guess(image, known, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::GpsCoordinates;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    fn ts(name: &str) -> Option<(String, Option<String>)> {
        parse_filename_timestamp(name).map(|t| {
            (
                t.date.format("%Y-%m-%d").to_string(),
                t.time.map(|t| t.format("%H:%M:%S").to_string()),
            )
        })
    }

    #[test]
    fn test_filename_conventions() {
        assert_eq!(
            ts("IMG_20230615_143000.jpg"),
            Some(("2023-06-15".into(), Some("14:30:00".into())))
        );
        assert_eq!(
            ts("PXL_20230615_143000123.jpg"),
            Some(("2023-06-15".into(), Some("14:30:00".into())))
        );
        assert_eq!(ts("20230615_143000.jpg"), Some(("2023-06-15".into(), Some("14:30:00".into()))));
        assert_eq!(ts("20230615143000.jpg"), Some(("2023-06-15".into(), Some("14:30:00".into()))));
        assert_eq!(
            ts("Screenshot_2023-06-15-14-30-00.png"),
            Some(("2023-06-15".into(), Some("14:30:00".into())))
        );
        assert_eq!(ts("IMG-20230615-WA0001.jpg"), Some(("2023-06-15".into(), None)));
        assert_eq!(ts("holiday 2021-12-24.jpg"), Some(("2021-12-24".into(), None)));
    }

    #[test]
    fn test_filename_without_timestamp() {
        assert_eq!(ts("IMG_1234.JPG"), None);
        assert_eq!(ts("DSC_0042.jpg"), None);
        assert_eq!(ts("IMG_20231345_250000.jpg"), None);
    }

    #[test]
    fn test_device_from_filename() {
        assert_eq!(device_from_filename("PXL_20230615_143000123.jpg"), Some("Google Pixel"));
        assert_eq!(device_from_filename("IMG_1234.HEIC"), Some("iPhone"));
        assert_eq!(device_from_filename("IMG_E1234.jpg"), Some("iPhone"));
        assert_eq!(device_from_filename("_MG_5521.CR2"), Some("Dedicated Camera"));
        assert_eq!(device_from_filename("IMG_20230615_143000.jpg"), None);
    }

    #[test]
    fn test_size_buckets() {
        assert_eq!(SizeBucket::from_bytes(0), None);
        assert_eq!(SizeBucket::from_bytes(800_000), Some(SizeBucket::Small));
        assert_eq!(SizeBucket::from_bytes(2_500_000), Some(SizeBucket::Medium));
        assert_eq!(SizeBucket::from_bytes(7_200_000), Some(SizeBucket::Large));
        assert_eq!(SizeBucket::from_bytes(24_000_000), Some(SizeBucket::Huge));
        assert_eq!(SizeBucket::Large.device_guess(), "Flagship Smartphone");
        assert_eq!(SizeBucket::Huge.lens_guess(), Some("Telephoto"));
    }

    #[test]
    fn test_lens_weights_roughly_hold() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut counts = [0usize; 4];
        for _ in 0..10_000 {
            let lens = random_lens_class(&mut rng);
            let idx = LENS_CLASSES.iter().position(|(name, _)| *name == lens).unwrap();
            counts[idx] += 1;
        }
        for (count, (_, weight)) in counts.iter().zip(LENS_CLASSES.iter()) {
            let expected = *weight as f64 * 100.0;
            assert!((*count as f64 - expected).abs() < expected * 0.15, "{:?}", counts);
        }
    }

    #[test]
    fn test_guess_keeps_known_fields() {
        let known = ImageMetadata {
            iso: Some(64),
            phone_type: Some("Apple iPhone 14 Pro".into()),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let upload = UploadedImage::new("IMG_20230615_143000.jpg", 7_200_000);
        let guess = HeuristicStage.guess(&upload, &known, &mut rng);
        assert_eq!(guess.iso, Some(64));
        assert_eq!(guess.phone_type.as_deref(), Some("Apple iPhone 14 Pro"));
        assert_eq!(guess.time_of_day, Some(TimeOfDay::Day));
        assert_eq!(guess.season, Some(Season::Summer));
        assert_eq!((guess.width, guess.height), (Some(4032), Some(3024)));
    }

    #[test]
    fn test_season_uses_hemisphere() {
        let known = ImageMetadata {
            gps: Some(GpsCoordinates { latitude: -33.86, longitude: 151.2 }),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let upload = UploadedImage::new("IMG_20230615_143000.jpg", 7_200_000);
        let guess = HeuristicStage.guess(&upload, &known, &mut rng);
        assert_eq!(guess.season, Some(Season::Winter));
    }

    #[test]
    fn test_guess_is_reproducible_with_same_seed() {
        let upload = UploadedImage::new("photo.jpg", 0);
        let known = ImageMetadata::default();
        let a = HeuristicStage.guess(&upload, &known, &mut StdRng::seed_from_u64(11));
        let b = HeuristicStage.guess(&upload, &known, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
        assert!(a.phone_type.is_some());
        assert!(a.lens_type.is_some());
        assert_eq!(a.gps, None);
    }
}
