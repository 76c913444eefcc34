//! HTTP handlers for the server.

pub mod health;
pub mod metadata;
pub mod render;

use axum::{Json, extract::Multipart, http::StatusCode};
use serde_json::{Value, json};

/// Error response: status plus `{ "error": message }`.
pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Pull the `image` field out of a multipart body.
///
/// Returns the client-side file name and the raw bytes.
pub async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                api_error(StatusCode::BAD_REQUEST, format!("Failed to read image: {}", e))
            })?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(api_error(StatusCode::BAD_REQUEST, "No image file uploaded"))
}
