//! Single-image conversion integration tests.
//!
//! Run with: `cargo test -p imaginary-api --test convert_image_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{fixtures, setup_test_app};
use image::ImageFormat;

fn image_part(data: Vec<u8>, file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime)
}

fn jpeg_part(width: u32, height: u32) -> Part {
    image_part(fixtures::create_test_jpeg(width, height), "image.jpg", "image/jpeg")
}

#[tokio::test]
async fn test_rotate_jpeg_to_png_swaps_dimensions() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", jpeg_part(64, 32))
        .add_text("pipeline", r#"[{"op":"rotate","args":90}]"#)
        .add_text("format", "png");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/png");

    let body = response.as_bytes();
    assert_eq!(fixtures::detect_format(body), ImageFormat::Png);
    assert_eq!(fixtures::dimensions(body), (32, 64));
}

#[tokio::test]
async fn test_resize_contain_to_jpeg() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", image_part(fixtures::create_test_png(200, 100), "a.png", "image/png"))
        .add_text(
            "pipeline",
            r#"[{"op":"resize","args":{"fit":"contain","maxWidth":100}}]"#,
        )
        .add_text("format", "jpeg");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/jpeg");
    let body = response.as_bytes();
    assert_eq!(fixtures::detect_format(body), ImageFormat::Jpeg);
    assert_eq!(fixtures::dimensions(body), (100, 50));
}

#[tokio::test]
async fn test_webp_output_with_multi_step_pipeline() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", jpeg_part(40, 20))
        .add_text(
            "pipeline",
            r#"[{"op":"flip"},{"op":"flop"},{"op":"blur","args":1.5},{"op":"rotate","args":270}]"#,
        )
        .add_text("format", "webp");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/webp");
    let body = response.as_bytes();
    assert_eq!(fixtures::detect_format(body), ImageFormat::WebP);
    assert_eq!(fixtures::dimensions(body), (20, 40));
}

#[tokio::test]
async fn test_missing_image() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_text("pipeline", r#"[{"op":"flip"}]"#)
        .add_text("format", "png");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("image missing"));
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_image_reported_before_other_missing_fields() {
    let client = setup_test_app();

    let form = MultipartForm::new().add_text("format", "nope");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("image missing"));
}

#[tokio::test]
async fn test_missing_pipeline() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", jpeg_part(8, 8))
        .add_text("format", "png");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("pipeline missing"));
}

#[tokio::test]
async fn test_missing_format() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", jpeg_part(8, 8))
        .add_text("pipeline", r#"[{"op":"flip"}]"#);
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("format missing"));
}

#[tokio::test]
async fn test_invalid_format_checked_before_pipeline() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", jpeg_part(8, 8))
        .add_text("pipeline", "not json")
        .add_text("format", "gif");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("invalid format"));
}

#[tokio::test]
async fn test_invalid_pipeline_lists_field_errors() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", jpeg_part(8, 8))
        .add_text(
            "pipeline",
            r#"[{"op":"sharpen"},{"op":"blur","args":0.1}]"#,
        )
        .add_text("format", "png");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid pipeline: "));
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let paths: Vec<&str> = body["field_errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.iter().any(|p| p.starts_with("pipeline[0]")));
    assert!(paths.iter().any(|p| p.starts_with("pipeline[1]")));
}

#[tokio::test]
async fn test_undecodable_image_is_client_error() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part(
            "image",
            image_part(b"definitely not an image".to_vec(), "x.jpg", "image/jpeg"),
        )
        .add_text("pipeline", r#"[{"op":"flip"}]"#)
        .add_text("format", "png");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "IMAGE_PROCESSING_ERROR");
}

#[tokio::test]
async fn test_resize_beyond_output_limits_is_client_error() {
    let client = setup_test_app();

    let form = MultipartForm::new()
        .add_part("image", image_part(fixtures::create_test_png(1, 1000), "thin.png", "image/png"))
        .add_text("pipeline", r#"[{"op":"resize","args":{"width":16384}}]"#)
        .add_text("format", "png");
    let response = client.post("/convert/image").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "IMAGE_PROCESSING_ERROR");
    assert!(body["error"].as_str().unwrap().contains("16384x16384000"));

    let health = client.get("/healthz").await;
    assert_eq!(health.status_code(), StatusCode::OK);
}
