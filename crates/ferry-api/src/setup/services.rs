//! Wiring repositories, storage and the crawl fetcher into the application state

use anyhow::Result;
use ferry_core::Config;
use ferry_db::{
    DownloadTokenRepository, ImageCacheRepository, MatterRepository, UploadTokenRepository,
    UserRepository,
};
use ferry_services::HttpFetcher;
use ferry_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::state::{AppState, Stores};

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let stores = Stores {
        users: Arc::new(UserRepository::new(pool.clone())),
        matters: Arc::new(MatterRepository::new(pool.clone())),
        upload_tokens: Arc::new(UploadTokenRepository::new(pool.clone())),
        download_tokens: Arc::new(DownloadTokenRepository::new(pool.clone())),
        image_caches: Arc::new(ImageCacheRepository::new(pool)),
    };

    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.crawl_timeout_secs()),
        config.crawl_max_size_bytes(),
        config.crawl_allow_private_ips(),
        config.url_upload_allowlist().map(<[String]>::to_vec),
    )?;

    tracing::info!(
        crawl_timeout_secs = config.crawl_timeout_secs(),
        crawl_max_size_bytes = config.crawl_max_size_bytes(),
        crawl_allowlist = ?config.url_upload_allowlist(),
        "Services initialized"
    );

    Ok(Arc::new(AppState::new(
        config.clone(),
        stores,
        storage,
        Arc::new(fetcher),
    )))
}
