//! Test helpers: build AppState over in-memory stores and a temp storage root.
//!
//! Run from workspace root: `cargo test -p ferry-api`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use chrono::Utc;
use ferry_api::setup::routes;
use ferry_api::{AppState, Stores};
use ferry_core::config::{BaseConfig, FerryConfig};
use ferry_core::models::{User, UserRole};
use ferry_core::{AppError, Config};
use ferry_db::test_helpers::{
    MockDownloadTokenStore, MockImageCacheStore, MockMatterStore, MockUploadTokenStore,
    MockUserStore,
};
use ferry_services::RemoteFetcher;
use ferry_storage::LocalStorage;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const JWT_SECRET: &str = "ferry-test-secret-0123456789abcdef";
pub const OWNER_EMAIL: &str = "owner@example.com";
pub const OTHER_EMAIL: &str = "other@example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "correct horse battery";

/// Serves the same body for every URL
pub struct StubFetcher {
    pub body: Bytes,
}

#[async_trait]
impl RemoteFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<Bytes, AppError> {
        Ok(self.body.clone())
    }
}

/// Test application: server, the stores behind it and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub users: Arc<MockUserStore>,
    pub matters: Arc<MockMatterStore>,
    pub upload_tokens: Arc<MockUploadTokenStore>,
    pub download_tokens: Arc<MockDownloadTokenStore>,
    pub image_caches: Arc<MockImageCacheStore>,
    pub owner: User,
    pub other: User,
    pub admin: User,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(temp_dir: &TempDir, cors_origins: &[&str]) -> Config {
    Config(Box::new(FerryConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: cors_origins.iter().map(|o| o.to_string()).collect(),
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: JWT_SECRET.to_string(),
            environment: "test".to_string(),
            trusted_proxy_count: 1,
        },
        database_url: "postgres://unused/ferry".to_string(),
        storage_root: temp_dir.path().to_path_buf(),
        max_upload_size_bytes: 10 * 1024 * 1024,
        crawl_timeout_secs: 5,
        crawl_max_size_bytes: 10 * 1024 * 1024,
        url_upload_allowlist: None,
        crawl_allow_private_ips: false,
    }))
}

fn user(email: &str, role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        // Low cost keeps the suite fast
        password_hash: bcrypt::hash(PASSWORD, 4).expect("hash password"),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Setup test app with mock stores and local storage in a temp dir.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_remote(Bytes::from_static(b"remote body")).await
}

/// Same as [`setup_test_app`], with crawls returning `remote_body`
pub async fn setup_test_app_with_remote(remote_body: Bytes) -> TestApp {
    build_test_app(remote_body, &["*"]).await
}

/// Same as [`setup_test_app`], with owner routes only answering `cors_origins`
pub async fn setup_test_app_with_cors(cors_origins: &[&str]) -> TestApp {
    build_test_app(Bytes::from_static(b"remote body"), cors_origins).await
}

async fn build_test_app(remote_body: Bytes, cors_origins: &[&str]) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir, cors_origins);

    let users = Arc::new(MockUserStore::new());
    let matters = Arc::new(MockMatterStore::new());
    let upload_tokens = Arc::new(MockUploadTokenStore::new());
    let download_tokens = Arc::new(MockDownloadTokenStore::new());
    let image_caches = Arc::new(MockImageCacheStore::new());

    let owner = user(OWNER_EMAIL, UserRole::User);
    let other = user(OTHER_EMAIL, UserRole::User);
    let admin = user(ADMIN_EMAIL, UserRole::Administrator);
    users.add_user(owner.clone());
    users.add_user(other.clone());
    users.add_user(admin.clone());

    let storage = LocalStorage::new(temp_dir.path())
        .await
        .expect("Failed to create local storage");

    let state = Arc::new(AppState::new(
        config.clone(),
        Stores {
            users: users.clone(),
            matters: matters.clone(),
            upload_tokens: upload_tokens.clone(),
            download_tokens: download_tokens.clone(),
            image_caches: image_caches.clone(),
        },
        Arc::new(storage),
        Arc::new(StubFetcher { body: remote_body }),
    ));

    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        users,
        matters,
        upload_tokens,
        download_tokens,
        image_caches,
        owner,
        other,
        admin,
        _temp_dir: temp_dir,
    }
}

/// Bearer header value carrying a session for `user`
pub fn bearer(user: &User) -> String {
    let token = ferry_api::auth::issue_session_token(user, JWT_SECRET, chrono::Duration::hours(1))
        .expect("sign session token");
    format!("Bearer {}", token)
}
