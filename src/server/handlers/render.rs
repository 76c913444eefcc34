//! Pattern rendering endpoint.

use axum::{
    extract::{Multipart, Query},
    http::{StatusCode, header},
    response::IntoResponse,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use super::{ApiError, api_error, read_image_field};
use crate::config::CanvasConfig;
use crate::metadata::{Extractor, UploadedImage};
use crate::params::{PatternKind, map_metadata};
use crate::render::render_still;

/// Frames rendered before export when the query does not say.
const DEFAULT_FRAMES: u32 = 30;
const MAX_FRAMES: u32 = 300;

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    /// Override the mapped pattern
    pub pattern: Option<String>,
    /// Seed for every random draw; random when absent
    pub seed: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frames: Option<u32>,
}

/// POST /api/render - Extract metadata offline, map it and render a PNG.
pub async fn render(
    Query(query): Query<RenderQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (file_name, bytes) = read_image_field(&mut multipart).await?;

    let pattern = match query.pattern.as_deref() {
        Some(name) => Some(PatternKind::by_name(name).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, format!("Unknown pattern: {}", name))
        })?),
        None => None,
    };

    let upload = tokio::task::spawn_blocking(move || UploadedImage::decode(file_name, bytes))
        .await
        .map_err(processing_error)?
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut rng = match query.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let metadata = Extractor::offline().extract(&upload, &mut rng).await;
    let mut params = map_metadata(&metadata, &mut rng);
    if let Some(pattern) = pattern {
        params.pattern = pattern;
    }

    let size = match (query.width, query.height) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => None,
    };
    let frames = query.frames.unwrap_or(DEFAULT_FRAMES).min(MAX_FRAMES);

    let png_bytes = tokio::task::spawn_blocking(move || {
        render_still(CanvasConfig::STUDIO, &params, size, frames)
    })
    .await
    .map_err(processing_error)?
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}

fn processing_error(e: tokio::task::JoinError) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Processing error: {}", e))
}
