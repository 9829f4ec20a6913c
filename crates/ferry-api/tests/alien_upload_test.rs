//! Delegated upload, crawl and confirm tests.
//!
//! Run with: `cargo test -p ferry-api --test alien_upload_test`

mod helpers;

use axum::http::Method;
use bytes::Bytes;
use helpers::fixtures::{request_upload_token, upload_token_id, upload_with_token};
use helpers::{
    setup_test_app, setup_test_app_with_cors, setup_test_app_with_remote, OWNER_EMAIL, PASSWORD,
};

#[tokio::test]
async fn test_upload_token_is_single_use() {
    let app = setup_test_app().await;
    let client = app.client();

    let token = upload_token_id(client, "report.pdf", 1024, true).await;

    let first = upload_with_token(client, &token, "report.pdf", vec![7u8; 1024]).await;
    assert_eq!(first.status_code(), 200);
    let body: serde_json::Value = first.json();
    assert_eq!(body["code"], "OK");
    assert_eq!(body["data"]["name"], "report.pdf");
    assert_eq!(body["data"]["size"], 1024);
    assert_eq!(body["data"]["privacy"], true);
    assert_eq!(body["data"]["user_id"], app.owner.id.to_string());

    let second = upload_with_token(client, &token, "report.pdf", vec![7u8; 1024]).await;
    assert_eq!(second.status_code(), 410);
    let body: serde_json::Value = second.json();
    assert_eq!(body["code"], "TOKEN_EXPIRED");

    assert_eq!(app.matters.len(), 1);
}

#[tokio::test]
async fn test_upload_integrity_mismatch_keeps_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let token = upload_token_id(client, "report.pdf", 1024, true).await;

    let wrong_name = upload_with_token(client, &token, "other.pdf", vec![0u8; 1024]).await;
    assert_eq!(wrong_name.status_code(), 409);

    let wrong_size = upload_with_token(client, &token, "report.pdf", vec![0u8; 1000]).await;
    assert_eq!(wrong_size.status_code(), 409);

    let matching = upload_with_token(client, &token, "report.pdf", vec![0u8; 1024]).await;
    assert_eq!(matching.status_code(), 200);
}

#[tokio::test]
async fn test_upload_with_unknown_or_missing_token() {
    let app = setup_test_app().await;
    let client = app.client();

    let unknown = upload_with_token(
        client,
        "8a1d3c3e-8f43-4a53-9c55-0d4b9b1a2f10",
        "report.pdf",
        vec![0u8; 4],
    )
    .await;
    assert_eq!(unknown.status_code(), 404);

    let missing = upload_with_token(client, "", "report.pdf", vec![0u8; 4]).await;
    assert_eq!(missing.status_code(), 400);
}

#[tokio::test]
async fn test_issue_upload_token_rejects_bad_input() {
    let app = setup_test_app().await;
    let client = app.client();

    let bad_expire = request_upload_token(client, "a.txt", 10, false, "0").await;
    assert_eq!(bad_expire.status_code(), 400);

    let bad_name = request_upload_token(client, "a/b.txt", 10, false, "60").await;
    assert_eq!(bad_name.status_code(), 400);

    let bad_password = client
        .post("/api/alien/fetch/upload/token")
        .form(&[
            ("filename", "a.txt"),
            ("size", "10"),
            ("privacy", "false"),
            ("dir", "/"),
            ("email", OWNER_EMAIL),
            ("password", "wrong"),
        ])
        .await;
    assert_eq!(bad_password.status_code(), 401);

    let missing_folder = client
        .post("/api/alien/fetch/upload/token")
        .form(&[
            ("filename", "a.txt"),
            ("size", "10"),
            ("privacy", "false"),
            ("dir", "/nowhere"),
            ("email", OWNER_EMAIL),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(missing_folder.status_code(), 404);
}

#[tokio::test]
async fn test_invalid_forms_rejected_before_authentication() {
    let app = setup_test_app().await;
    let client = app.client();

    // Wrong password everywhere: a 400 proves the form was rejected first
    let bad_privacy = client
        .post("/api/alien/crawl/direct")
        .form(&[
            ("filename", "remote.bin"),
            ("url", "https://example.com/remote.bin"),
            ("privacy", "yes"),
            ("email", OWNER_EMAIL),
            ("password", "wrong"),
        ])
        .await;
    assert_eq!(bad_privacy.status_code(), 400);
    let body: serde_json::Value = bad_privacy.json();
    assert_eq!(body["code"], "INVALID_INPUT");

    let bad_size = client
        .post("/api/alien/fetch/upload/token")
        .form(&[
            ("filename", "a.txt"),
            ("size", "0"),
            ("privacy", "false"),
            ("dir", "/"),
            ("email", OWNER_EMAIL),
            ("password", "wrong"),
        ])
        .await;
    assert_eq!(bad_size.status_code(), 400);

    let bad_matter = client
        .post("/api/alien/fetch/download/token")
        .form(&[
            ("matterUuid", "not-a-uuid"),
            ("email", OWNER_EMAIL),
            ("password", "wrong"),
        ])
        .await;
    assert_eq!(bad_matter.status_code(), 400);

    let missing_email = client
        .post("/api/alien/confirm")
        .form(&[
            ("matterUuid", uuid::Uuid::new_v4().to_string().as_str()),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(missing_email.status_code(), 400);

    assert!(app.upload_tokens.is_empty());
}

#[tokio::test]
async fn test_issued_upload_token_records_binding() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = request_upload_token(client, "photo.png", 2048, false, "120").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    let data = &body["data"];
    assert_eq!(data["filename"], "photo.png");
    assert_eq!(data["size"], 2048);
    assert_eq!(data["privacy"], false);
    assert!(data["matter_uuid"].is_null());
    assert_eq!(data["user_id"], app.owner.id.to_string());
}

#[tokio::test]
async fn test_confirm_after_upload() {
    let app = setup_test_app().await;
    let client = app.client();

    let token = upload_token_id(client, "notes.txt", 5, false).await;
    let uploaded = upload_with_token(client, &token, "notes.txt", b"hello".to_vec()).await;
    let body: serde_json::Value = uploaded.json();
    let matter_id = body["data"]["id"].as_str().unwrap().to_string();

    let confirmed = client
        .post("/api/alien/confirm")
        .form(&[
            ("matterUuid", matter_id.as_str()),
            ("email", OWNER_EMAIL),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(confirmed.status_code(), 200);
    let body: serde_json::Value = confirmed.json();
    assert_eq!(body["data"]["id"], matter_id);

    let foreign = client
        .post("/api/alien/confirm")
        .form(&[
            ("matterUuid", matter_id.as_str()),
            ("email", helpers::OTHER_EMAIL),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(foreign.status_code(), 403);
}

#[tokio::test]
async fn test_crawl_with_token_binds_once() {
    let app = setup_test_app_with_remote(Bytes::from_static(b"fetched remotely")).await;
    let client = app.client();

    let token = upload_token_id(client, "page.html", 16, false).await;

    let crawled = client
        .post("/api/alien/crawl/token")
        .form(&[
            ("uploadTokenUuid", token.as_str()),
            ("url", "https://example.com/page.html"),
        ])
        .await;
    assert_eq!(crawled.status_code(), 200);
    let body: serde_json::Value = crawled.json();
    assert_eq!(body["data"]["name"], "page.html");
    assert_eq!(body["data"]["size"], 16);

    let again = client
        .post("/api/alien/crawl/token")
        .form(&[
            ("uploadTokenUuid", token.as_str()),
            ("url", "https://example.com/page.html"),
        ])
        .await;
    assert_eq!(again.status_code(), 410);
}

#[tokio::test]
async fn test_crawl_rejects_bad_url_before_claiming() {
    let app = setup_test_app().await;
    let client = app.client();

    let token = upload_token_id(client, "page.html", 16, false).await;

    let bad = client
        .post("/api/alien/crawl/token")
        .form(&[("uploadTokenUuid", token.as_str()), ("url", "ftp://example.com/x")])
        .await;
    assert_eq!(bad.status_code(), 400);

    let good = client
        .post("/api/alien/crawl/token")
        .form(&[
            ("uploadTokenUuid", token.as_str()),
            ("url", "https://example.com/page.html"),
        ])
        .await;
    assert_eq!(good.status_code(), 200);
}

#[tokio::test]
async fn test_crawl_direct_needs_credentials() {
    let app = setup_test_app().await;
    let client = app.client();

    let denied = client
        .post("/api/alien/crawl/direct")
        .form(&[
            ("filename", "remote.bin"),
            ("url", "https://example.com/remote.bin"),
            ("privacy", "true"),
            ("dir", "/"),
            ("email", OWNER_EMAIL),
            ("password", "nope"),
        ])
        .await;
    assert_eq!(denied.status_code(), 401);

    let stored = client
        .post("/api/alien/crawl/direct")
        .form(&[
            ("filename", "remote.bin"),
            ("url", "https://example.com/remote.bin"),
            ("privacy", "true"),
            ("dir", "/"),
            ("email", OWNER_EMAIL),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(stored.status_code(), 200);
    let body: serde_json::Value = stored.json();
    assert_eq!(body["data"]["name"], "remote.bin");
    assert_eq!(body["data"]["privacy"], true);
}

#[tokio::test]
async fn test_only_token_routes_answer_any_origin() {
    let app = setup_test_app_with_cors(&["https://owner.example"]).await;
    let client = app.client();

    let preflight = |path: &'static str, origin: &'static str| {
        client
            .method(Method::OPTIONS, path)
            .add_header("Origin", origin)
            .add_header("Access-Control-Request-Method", "POST")
    };

    for path in ["/api/alien/upload", "/api/alien/crawl/token"] {
        let response = preflight(path, "https://partner.example").await;
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*",
            "{}",
            path
        );
    }

    let foreign = preflight("/api/alien/crawl/direct", "https://partner.example").await;
    assert!(foreign.headers().get("access-control-allow-origin").is_none());

    let owner = preflight("/api/alien/crawl/direct", "https://owner.example").await;
    assert_eq!(
        owner.headers().get("access-control-allow-origin").unwrap(),
        "https://owner.example"
    );
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "alive");
}
