//! Liveness probe.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: format!(
            "Metadata service running for {}s",
            state.started_at.elapsed().as_secs()
        ),
    })
}
