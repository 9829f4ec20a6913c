//! Store traits the service layer depends on
//!
//! Each trait is implemented by its Postgres repository and, for tests, by the
//! mock stores in `test_helpers`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferry_core::models::{
    DownloadToken, ImageCache, Matter, NewDownloadToken, NewImageCache, NewMatter,
    NewUploadToken, UploadToken, User,
};
use ferry_core::AppError;
use uuid::Uuid;

use crate::db::{
    DownloadTokenRepository, ImageCacheRepository, MatterRepository, UploadTokenRepository,
    UserRepository,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait MatterStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Matter>, AppError>;

    /// Direct child of `puuid` (the owner's root when `None`) with this name and kind
    async fn find_child(
        &self,
        user_id: Uuid,
        puuid: Option<Uuid>,
        name: &str,
        dir: bool,
    ) -> Result<Option<Matter>, AppError>;

    async fn create(&self, new: NewMatter) -> Result<Matter, AppError>;
}

#[async_trait]
pub trait UploadTokenStore: Send + Sync {
    async fn create(&self, new: NewUploadToken) -> Result<UploadToken, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<UploadToken>, AppError>;

    /// Atomically move the expiry to `new_expire_at` if the token is live at `now`.
    /// `None` means someone else retired it first (or it was already dead).
    async fn retire(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<UploadToken>, AppError>;

    /// Undo a retirement if nothing touched the expiry since.
    async fn restore(
        &self,
        id: Uuid,
        retired_at: DateTime<Utc>,
        original_expire_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn bind_matter(&self, id: Uuid, matter_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait DownloadTokenStore: Send + Sync {
    async fn create(&self, new: NewDownloadToken) -> Result<DownloadToken, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<DownloadToken>, AppError>;

    /// Atomically mark the first use at `now` and move the expiry to
    /// `new_expire_at`, if the token is live and unconsumed. `None` otherwise.
    async fn consume(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<DownloadToken>, AppError>;
}

#[async_trait]
pub trait ImageCacheStore: Send + Sync {
    async fn find_by_uri(&self, uri: &str) -> Result<Option<ImageCache>, AppError>;

    /// Insert, or return the record that already holds this URI
    async fn create(&self, new: NewImageCache) -> Result<ImageCache, AppError>;
}

// Implementations for the Postgres repositories

#[async_trait]
impl UserStore for UserRepository {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.get_user(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        UserRepository::find_by_email(self, email).await
    }
}

#[async_trait]
impl MatterStore for MatterRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Matter>, AppError> {
        self.get_matter(id).await
    }

    async fn find_child(
        &self,
        user_id: Uuid,
        puuid: Option<Uuid>,
        name: &str,
        dir: bool,
    ) -> Result<Option<Matter>, AppError> {
        MatterRepository::find_child(self, user_id, puuid, name, dir).await
    }

    async fn create(&self, new: NewMatter) -> Result<Matter, AppError> {
        self.create_matter(new).await
    }
}

#[async_trait]
impl UploadTokenStore for UploadTokenRepository {
    async fn create(&self, new: NewUploadToken) -> Result<UploadToken, AppError> {
        self.create_token(new).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<UploadToken>, AppError> {
        self.get_token(id).await
    }

    async fn retire(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<UploadToken>, AppError> {
        self.retire_token(id, now, new_expire_at).await
    }

    async fn restore(
        &self,
        id: Uuid,
        retired_at: DateTime<Utc>,
        original_expire_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        self.restore_token(id, retired_at, original_expire_at).await
    }

    async fn bind_matter(&self, id: Uuid, matter_id: Uuid) -> Result<(), AppError> {
        UploadTokenRepository::bind_matter(self, id, matter_id).await
    }
}

#[async_trait]
impl DownloadTokenStore for DownloadTokenRepository {
    async fn create(&self, new: NewDownloadToken) -> Result<DownloadToken, AppError> {
        self.create_token(new).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<DownloadToken>, AppError> {
        self.get_token(id).await
    }

    async fn consume(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<DownloadToken>, AppError> {
        self.consume_token(id, now, new_expire_at).await
    }
}

#[async_trait]
impl ImageCacheStore for ImageCacheRepository {
    async fn find_by_uri(&self, uri: &str) -> Result<Option<ImageCache>, AppError> {
        ImageCacheRepository::find_by_uri(self, uri).await
    }

    async fn create(&self, new: NewImageCache) -> Result<ImageCache, AppError> {
        self.create_cache(new).await
    }
}
