//! Stage 1: ask the local metadata service.
//!
//! Uploads the original file to `POST /api/extract-metadata` (see
//! [`crate::server`]) and takes whatever the service reports. Connection
//! errors, non-2xx answers and malformed bodies all mean "no answer".

use async_trait::async_trait;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::exiftool::ExtractResponse;
use super::{ExtractionStage, ImageMetadata, UploadedImage};
use crate::error::GlyphError;

/// Default endpoint of a service started with `shutterglyph serve`.
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:3001/api/extract-metadata";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Metadata service client stage.
///
/// The HTTP client is built on first use; a client that cannot be built
/// (for example when the TLS backend fails to initialize) is an extraction
/// error like any other and the stage contributes nothing.
pub struct ServiceStage {
    client: OnceCell<reqwest::Client>,
    url: String,
}

impl ServiceStage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: OnceCell::new(),
            url: url.into(),
        }
    }

    async fn client(&self) -> Result<&reqwest::Client, GlyphError> {
        self.client
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .user_agent("shutterglyph/0.1")
                    .timeout(REQUEST_TIMEOUT)
                    .build()
                    .map_err(|e| {
                        GlyphError::Extraction(format!("HTTP client setup failed: {}", e))
                    })
            })
            .await
    }

    async fn fetch(&self, image: &UploadedImage) -> Result<ImageMetadata, GlyphError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.as_ref().clone())
            .file_name(image.file_name.clone());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client()
            .await?
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GlyphError::Extraction(format!("service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GlyphError::Extraction(format!("service answered {}", status)));
        }

        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| GlyphError::Extraction(format!("malformed service response: {}", e)))?;
        Ok(body.metadata)
    }
}

#[async_trait]
impl ExtractionStage for ServiceStage {
    fn name(&self) -> &'static str {
        "service"
    }

    async fn extract(
        &self,
        image: &UploadedImage,
        _known: &ImageMetadata,
        _rng: &mut StdRng,
    ) -> ImageMetadata {
        match self.fetch(image).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "[extract] service stage skipped");
                ImageMetadata::default()
            }
        }
    }
}
