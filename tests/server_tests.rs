//! # Server Tests
//!
//! Drive the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

use shutterglyph::server::{AppState, ServerConfig, router};

const BOUNDARY: &str = "shutterglyph-test-boundary";

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("shutterglyph-{}-{}", name, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn app(upload_dir: PathBuf, exiftool: &str) -> axum::Router {
    router(Arc::new(AppState::new(ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        upload_dir,
        exiftool_path: exiftool.to_string(),
    })))
}

/// Multipart body with a single file field.
fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn small_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([40, 90, 160])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(test_dir("health"), "exiftool")
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "OK");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_missing_image_field_is_bad_request() {
    let response = app(test_dir("nofield"), "exiftool")
        .oneshot(upload_request(
            "/api/extract-metadata",
            multipart_body("photo", "a.jpg", b"abc"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No image file uploaded");
}

#[tokio::test]
async fn test_exiftool_failure_is_500_and_cleans_up() {
    let dir = test_dir("broken");
    let response = app(dir.clone(), "/nonexistent/exiftool")
        .oneshot(upload_request(
            "/api/extract-metadata",
            multipart_body("image", "IMG_0001.jpg", b"not really a jpeg"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Failed to extract metadata");
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_extract_reshapes_exiftool_output() {
    use std::os::unix::fs::PermissionsExt;

    let dir = test_dir("fake-exiftool");
    let script = dir.join("exiftool.sh");
    let record = r#"[{"Make":"Google","Model":"Pixel 7","ISO":800,"FNumber":1.85,"Flash":1,"#
        .to_string()
        + r#""DateTimeOriginal":"2023:12:24 22:10:00"}]"#;
    std::fs::write(&script, format!("#!/bin/sh\necho '{}'\n", record)).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let uploads = test_dir("fake-uploads");
    let response = app(uploads.clone(), script.to_str().unwrap())
        .oneshot(upload_request(
            "/api/extract-metadata",
            multipart_body("image", "PXL_20231224_221000.jpg", &small_png()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["phoneType"], "Google Pixel 7");
    assert_eq!(body["iso"], 800);
    assert_eq!(body["flash"], true);
    assert_eq!(body["timeOfDay"], "night");
    assert_eq!(body["rawMetadata"]["Model"], "Pixel 7");
    assert_eq!(std::fs::read_dir(&uploads).unwrap().count(), 0);
}

#[tokio::test]
async fn test_render_returns_png() {
    let response = app(test_dir("render"), "exiftool")
        .oneshot(upload_request(
            "/api/render?pattern=flow&seed=3&frames=2&width=240&height=200",
            multipart_body("image", "photo.png", &small_png()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (480, 400));
}

#[tokio::test]
async fn test_render_rejects_unknown_pattern() {
    let response = app(test_dir("render-bad"), "exiftool")
        .oneshot(upload_request(
            "/api/render?pattern=spiral",
            multipart_body("image", "photo.png", &small_png()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_render_rejects_undecodable_image() {
    let response = app(test_dir("render-garbage"), "exiftool")
        .oneshot(upload_request(
            "/api/render",
            multipart_body("image", "photo.jpg", b"garbage"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
