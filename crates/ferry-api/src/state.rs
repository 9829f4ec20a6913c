//! Application state
//!
//! Everything is built once from the stores, the storage backend and the crawl
//! fetcher, then shared behind an `Arc` by every handler.

use ferry_core::Config;
use ferry_db::{DownloadTokenStore, ImageCacheStore, MatterStore, UploadTokenStore, UserStore};
use ferry_services::{
    CredentialVerifier, DownloadAuthorizer, DownloadTokenIssuer, ImageCacheCoordinator,
    ImageResizeMaterializer, MatterIngestor, RemoteFetcher, UploadService, UploadTokenIssuer,
};
use ferry_storage::Storage;
use std::sync::Arc;

/// Persistence adapters the services are wired to
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub matters: Arc<dyn MatterStore>,
    pub upload_tokens: Arc<dyn UploadTokenStore>,
    pub download_tokens: Arc<dyn DownloadTokenStore>,
    pub image_caches: Arc<dyn ImageCacheStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub storage: Arc<dyn Storage>,
    pub credentials: CredentialVerifier,
    pub upload_issuer: UploadTokenIssuer,
    pub download_issuer: DownloadTokenIssuer,
    pub uploads: UploadService,
    pub authorizer: DownloadAuthorizer,
    pub image_cache: ImageCacheCoordinator,
}

impl AppState {
    pub fn new(
        config: Config,
        stores: Stores,
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        let ingestor = MatterIngestor::new(stores.matters.clone(), storage.clone());

        Self {
            credentials: CredentialVerifier::new(stores.users.clone()),
            upload_issuer: UploadTokenIssuer::new(stores.upload_tokens.clone()),
            download_issuer: DownloadTokenIssuer::new(
                stores.download_tokens.clone(),
                stores.matters.clone(),
            ),
            uploads: UploadService::new(
                stores.upload_tokens,
                stores.users.clone(),
                stores.matters.clone(),
                ingestor,
                fetcher,
            ),
            authorizer: DownloadAuthorizer::new(stores.matters, stores.download_tokens),
            image_cache: ImageCacheCoordinator::new(
                stores.image_caches,
                storage.clone(),
                Arc::new(ImageResizeMaterializer),
            ),
            users: stores.users,
            storage,
            config,
        }
    }
}
