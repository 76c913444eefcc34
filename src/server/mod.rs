//! # Metadata Service
//!
//! Small HTTP service that extracts photo metadata with `exiftool` and
//! renders patterns on request.
//!
//! ## Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/api/extract-metadata` | multipart `image` | metadata JSON |
//! | POST | `/api/render` | multipart `image` | PNG |
//! | GET | `/api/health` | none | `{status, message}` |
//!
//! ## Usage
//!
//! ```bash
//! shutterglyph serve --listen 127.0.0.1:3001 --exiftool /usr/bin/exiftool
//! ```

mod handlers;
mod state;

pub use state::{AppState, DEFAULT_LISTEN_ADDR, MAX_UPLOAD_BYTES, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::GlyphError;

/// Build the router. Split from [`serve`] so tests can drive it directly.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/extract-metadata", post(handlers::metadata::extract))
        .route("/api/render", post(handlers::render::render))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use shutterglyph::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), shutterglyph::GlyphError> {
/// serve(ServerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), GlyphError> {
    tokio::fs::create_dir_all(&config.upload_dir).await.map_err(|e| {
        GlyphError::Server(format!(
            "Failed to create upload dir {}: {}",
            config.upload_dir.display(),
            e
        ))
    })?;

    let app = router(Arc::new(AppState::new(config.clone())));

    tracing::info!(
        listen = %config.listen_addr,
        upload_dir = %config.upload_dir.display(),
        exiftool = %config.exiftool_path,
        "[server] starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            GlyphError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| GlyphError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
