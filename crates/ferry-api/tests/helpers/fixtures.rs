//! Test fixtures and request shortcuts shared by the alien suites.

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use super::{OWNER_EMAIL, PASSWORD};

/// A real PNG of the given size
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

/// Ask for an upload token as the owner; returns the raw response
pub async fn request_upload_token(
    client: &TestServer,
    filename: &str,
    size: usize,
    privacy: bool,
    expire: &str,
) -> TestResponse {
    client
        .post("/api/alien/fetch/upload/token")
        .form(&[
            ("filename", filename.to_string()),
            ("size", size.to_string()),
            ("privacy", privacy.to_string()),
            ("expire", expire.to_string()),
            ("dir", "/".to_string()),
            ("email", OWNER_EMAIL.to_string()),
            ("password", PASSWORD.to_string()),
        ])
        .await
}

/// Issue an upload token and return its id
pub async fn upload_token_id(client: &TestServer, filename: &str, size: usize, privacy: bool) -> String {
    let response = request_upload_token(client, filename, size, privacy, "60").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    body["data"]["id"].as_str().expect("token id").to_string()
}

/// Post one file with an upload token
pub async fn upload_with_token(
    client: &TestServer,
    token: &str,
    filename: &str,
    data: Vec<u8>,
) -> TestResponse {
    let part = Part::bytes(data)
        .file_name(filename.to_string())
        .mime_type("application/octet-stream");
    let form = MultipartForm::new()
        .add_text("uploadTokenUuid", token.to_string())
        .add_part("file", part);
    client.post("/api/alien/upload").multipart(form).await
}

/// Upload `data` as `filename` through a fresh token; returns the matter id
pub async fn upload_file(client: &TestServer, filename: &str, data: Vec<u8>, privacy: bool) -> String {
    let token = upload_token_id(client, filename, data.len(), privacy).await;
    let response = upload_with_token(client, &token, filename, data).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    body["data"]["id"].as_str().expect("matter id").to_string()
}

/// Ask for a download token as the owner
pub async fn request_download_token(client: &TestServer, matter_id: &str) -> TestResponse {
    client
        .post("/api/alien/fetch/download/token")
        .form(&[
            ("matterUuid", matter_id.to_string()),
            ("email", OWNER_EMAIL.to_string()),
            ("password", PASSWORD.to_string()),
        ])
        .await
}
