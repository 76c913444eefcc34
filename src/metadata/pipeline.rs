//! Ordered, first-writer-wins extraction cascade.

use async_trait::async_trait;
use rand::rngs::StdRng;

use super::exif::ExifStage;
use super::heuristics::HeuristicStage;
use super::pixels::PixelStage;
use super::service::ServiceStage;
use super::{ImageMetadata, UploadedImage};

/// One source of metadata guesses.
///
/// Stages never fail: a stage that cannot contribute returns an empty
/// record. `known` is the record accumulated so far, for stages whose
/// guesses depend on earlier answers.
#[async_trait]
pub trait ExtractionStage: Send + Sync {
    /// Stage name used in logs.
    fn name(&self) -> &'static str;

    /// Produce a partial record. Fields already in `known` are ignored by the
    /// merge, whatever this returns for them.
    async fn extract(
        &self,
        image: &UploadedImage,
        known: &ImageMetadata,
        rng: &mut StdRng,
    ) -> ImageMetadata;
}

/// Runs stages in order and folds their output with
/// [`ImageMetadata::fill_missing`].
#[derive(Default)]
pub struct Extractor {
    stages: Vec<Box<dyn ExtractionStage>>,
}

impl Extractor {
    /// An extractor with no stages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl ExtractionStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Full cascade: service (when a URL is given), pixels, EXIF, heuristics.
    pub fn standard(service_url: Option<&str>) -> Self {
        let mut extractor = Self::new();
        if let Some(url) = service_url {
            extractor = extractor.stage(ServiceStage::new(url));
        }
        extractor
            .stage(PixelStage::default())
            .stage(ExifStage::default())
            .stage(HeuristicStage)
    }

    /// Cascade without the network stage.
    pub fn offline() -> Self {
        Self::standard(None)
    }

    /// Names of the configured stages, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage and return the merged record.
    pub async fn extract(&self, image: &UploadedImage, rng: &mut StdRng) -> ImageMetadata {
        let mut record = ImageMetadata::default();
        for stage in &self.stages {
            let found = stage.extract(image, &record, rng).await;
            let filled = record.fill_missing(found);
            tracing::debug!(
                stage = stage.name(),
                filled,
                known = record.known_fields(),
                "[extract] stage finished"
            );
        }
        tracing::info!(
            file = %image.file_name,
            known = record.known_fields(),
            "[extract] metadata ready"
        );
        record
    }
}
