//! Download authorization and resize-on-download tests.
//!
//! Run with: `cargo test -p ferry-api --test alien_download_test`

mod helpers;

use ferry_db::DownloadTokenStore;
use helpers::fixtures::{create_test_png, request_download_token, upload_file};
use helpers::{bearer, setup_test_app};
use uuid::Uuid;

fn download_path(matter_id: &str, filename: &str) -> String {
    format!("/api/alien/download/{}/{}", matter_id, filename)
}

async fn download_token_id(client: &axum_test::TestServer, matter_id: &str) -> String {
    let response = request_download_token(client, matter_id).await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    body["data"]["id"].as_str().expect("token id").to_string()
}

#[tokio::test]
async fn test_private_download_with_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let data = b"quarterly numbers".to_vec();
    let matter_id = upload_file(client, "report.pdf", data.clone(), true).await;
    let token = download_token_id(client, &matter_id).await;

    let response = client
        .get(&download_path(&matter_id, "report.pdf"))
        .add_query_param("downloadTokenUuid", &token)
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.as_bytes().to_vec(), data);
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(response.header("cache-control"), "private, no-store");
    assert_eq!(
        response.header("content-disposition"),
        "inline; filename*=UTF-8''report%2Epdf"
    );

    // Usable again inside its window
    let again = client
        .get(&download_path(&matter_id, "report.pdf"))
        .add_query_param("downloadTokenUuid", &token)
        .await;
    assert_eq!(again.status_code(), 200);
}

#[tokio::test]
async fn test_private_download_without_credentials() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "report.pdf", vec![1u8; 8], true).await;

    let response = client.get(&download_path(&matter_id, "report.pdf")).await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_token_for_other_file_is_forbidden() {
    let app = setup_test_app().await;
    let client = app.client();

    let first = upload_file(client, "a.txt", b"aaaa".to_vec(), true).await;
    let second = upload_file(client, "b.txt", b"bbbb".to_vec(), true).await;
    let token_for_first = download_token_id(client, &first).await;

    let response = client
        .get(&download_path(&second, "b.txt"))
        .add_query_param("downloadTokenUuid", &token_for_first)
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_unknown_download_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "a.txt", b"aaaa".to_vec(), true).await;

    let response = client
        .get(&download_path(&matter_id, "a.txt"))
        .add_query_param("downloadTokenUuid", "5f0e4b1c-6a7d-4c3e-8e45-2b1f0a9d7c61")
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_public_download_is_anonymous() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "notes.txt", b"hello".to_vec(), false).await;

    let response = client.get(&download_path(&matter_id, "notes.txt")).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "hello");
    assert_eq!(response.header("cache-control"), "public, max-age=3600");

    // A junk token is ignored for public files
    let with_junk = client
        .get(&download_path(&matter_id, "notes.txt"))
        .add_query_param("downloadTokenUuid", "junk")
        .await;
    assert_eq!(with_junk.status_code(), 200);
}

#[tokio::test]
async fn test_download_name_must_match() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "notes.txt", b"hello".to_vec(), false).await;

    let response = client.get(&download_path(&matter_id, "other.txt")).await;
    assert_eq!(response.status_code(), 409);

    let bad_id = client.get(&download_path("not-a-uuid", "notes.txt")).await;
    assert_eq!(bad_id.status_code(), 400);
}

#[tokio::test]
async fn test_private_download_by_session() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "secret.txt", b"s3cr3t".to_vec(), true).await;
    let path = download_path(&matter_id, "secret.txt");

    let owner = client
        .get(&path)
        .add_header("Authorization", bearer(&app.owner))
        .await;
    assert_eq!(owner.status_code(), 200);
    assert_eq!(owner.text(), "s3cr3t");

    let admin = client
        .get(&path)
        .add_header("Authorization", bearer(&app.admin))
        .await;
    assert_eq!(admin.status_code(), 200);

    let stranger = client
        .get(&path)
        .add_header("Authorization", bearer(&app.other))
        .await;
    assert_eq!(stranger.status_code(), 401);

    let garbage = client
        .get(&path)
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(garbage.status_code(), 401);
}

#[tokio::test]
async fn test_download_token_only_for_own_files() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "mine.txt", b"mine".to_vec(), true).await;

    let foreign = client
        .post("/api/alien/fetch/download/token")
        .form(&[
            ("matterUuid", matter_id.as_str()),
            ("email", helpers::OTHER_EMAIL),
            ("password", helpers::PASSWORD),
        ])
        .await;
    assert_eq!(foreign.status_code(), 403);

    let missing = request_download_token(client, "0b9c3f57-2d4e-4f7a-9b1c-6e8d5a4c3b21").await;
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn test_resized_download_is_cached() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "photo.png", create_test_png(40, 20), false).await;
    let path = download_path(&matter_id, "photo.png");

    let resized = client.get(&path).add_query_param("ir", "fit_10_0").await;
    assert_eq!(resized.status_code(), 200);
    assert_eq!(resized.header("content-type"), "image/png");
    let img = image::load_from_memory(&resized.as_bytes()).expect("decode resized image");
    assert_eq!((img.width(), img.height()), (10, 5));
    assert_eq!(app.image_caches.len(), 1);

    let cached = client.get(&path).add_query_param("ir", "fit_10_0").await;
    assert_eq!(cached.status_code(), 200);
    assert_eq!(cached.as_bytes(), resized.as_bytes());
    assert_eq!(app.image_caches.len(), 1);

    let legacy = client
        .get(&path)
        .add_query_param("imageProcess", "resize")
        .add_query_param("imageResizeM", "fixed")
        .add_query_param("imageResizeW", "8")
        .add_query_param("imageResizeH", "8")
        .await;
    assert_eq!(legacy.status_code(), 200);
    let img = image::load_from_memory(&legacy.as_bytes()).expect("decode resized image");
    assert_eq!((img.width(), img.height()), (8, 8));
    assert_eq!(app.image_caches.len(), 2);

    let original = client.get(&path).await;
    let img = image::load_from_memory(&original.as_bytes()).expect("decode original");
    assert_eq!((img.width(), img.height()), (40, 20));
}

#[tokio::test]
async fn test_resize_rejects_bad_params() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "photo.png", create_test_png(4, 4), false).await;

    let response = client
        .get(&download_path(&matter_id, "photo.png"))
        .add_query_param("ir", "crop_10_10")
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_resize_of_non_image_is_upstream_error() {
    let app = setup_test_app().await;
    let client = app.client();

    let matter_id = upload_file(client, "fake.png", b"not an image".to_vec(), false).await;

    let response = client
        .get(&download_path(&matter_id, "fake.png"))
        .add_query_param("ir", "fit_10_0")
        .await;
    assert_eq!(response.status_code(), 502);
    assert_eq!(app.image_caches.len(), 0);
}

#[tokio::test]
async fn test_failed_download_leaves_token_unused() {
    let app = setup_test_app().await;
    let client = app.client();

    let photo = upload_file(client, "photo.png", create_test_png(8, 8), true).await;
    let photo_token = download_token_id(client, &photo).await;
    let photo_token_id = Uuid::parse_str(&photo_token).unwrap();
    let issued = app.download_tokens.get(photo_token_id).await.unwrap().unwrap();

    let bad_params = client
        .get(&download_path(&photo, "photo.png"))
        .add_query_param("downloadTokenUuid", &photo_token)
        .add_query_param("ir", "bogus_10_10")
        .await;
    assert_eq!(bad_params.status_code(), 400);
    assert_eq!(
        app.download_tokens.get(photo_token_id).await.unwrap().unwrap(),
        issued
    );

    let fake = upload_file(client, "fake.png", b"not an image".to_vec(), true).await;
    let fake_token = download_token_id(client, &fake).await;
    let fake_token_id = Uuid::parse_str(&fake_token).unwrap();
    let fake_issued = app.download_tokens.get(fake_token_id).await.unwrap().unwrap();

    let unprocessable = client
        .get(&download_path(&fake, "fake.png"))
        .add_query_param("downloadTokenUuid", &fake_token)
        .add_query_param("ir", "fit_10_0")
        .await;
    assert_eq!(unprocessable.status_code(), 502);
    assert_eq!(
        app.download_tokens.get(fake_token_id).await.unwrap().unwrap(),
        fake_issued
    );

    // A served download is what starts the one-day window
    let served = client
        .get(&download_path(&photo, "photo.png"))
        .add_query_param("downloadTokenUuid", &photo_token)
        .await;
    assert_eq!(served.status_code(), 200);
    let used = app.download_tokens.get(photo_token_id).await.unwrap().unwrap();
    assert!(used.consumed_at.is_some());
    assert!(used.expire_at > issued.expire_at);
}
