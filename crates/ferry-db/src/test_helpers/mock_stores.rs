//! Mock store implementations for testing
//!
//! These keep everything in memory and mirror the conditional-update semantics
//! of the Postgres repositories, so token races can be tested without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ferry_core::models::{
    DownloadToken, ImageCache, Matter, NewDownloadToken, NewImageCache, NewMatter,
    NewUploadToken, UploadToken, User,
};
use ferry_core::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::traits::{DownloadTokenStore, ImageCacheStore, MatterStore, UploadTokenStore, UserStore};

/// Mock user store
#[derive(Clone, Default)]
pub struct MockUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MockUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

/// Mock matter store
#[derive(Clone, Default)]
pub struct MockMatterStore {
    matters: Arc<Mutex<HashMap<Uuid, Matter>>>,
    fail_creates: Arc<AtomicBool>,
}

impl MockMatterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a matter
    pub fn add_matter(&self, matter: Matter) {
        self.matters.lock().unwrap().insert(matter.id, matter);
    }

    /// Make every following `create` fail with a database-style error
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.matters.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MatterStore for MockMatterStore {
    async fn get(&self, id: Uuid) -> Result<Option<Matter>, AppError> {
        Ok(self.matters.lock().unwrap().get(&id).cloned())
    }

    async fn find_child(
        &self,
        user_id: Uuid,
        puuid: Option<Uuid>,
        name: &str,
        dir: bool,
    ) -> Result<Option<Matter>, AppError> {
        Ok(self
            .matters
            .lock()
            .unwrap()
            .values()
            .find(|m| m.user_id == user_id && m.puuid == puuid && m.name == name && m.dir == dir)
            .cloned())
    }

    async fn create(&self, new: NewMatter) -> Result<Matter, AppError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("mock matter store refused insert".to_string()));
        }

        let mut matters = self.matters.lock().unwrap();
        let duplicate = matters.values().any(|m| {
            m.user_id == new.user_id && m.puuid == new.puuid && m.name == new.name && !m.dir
        });
        if duplicate {
            return Err(AppError::InvalidInput(format!(
                "A file named '{}' already exists in this folder",
                new.name
            )));
        }

        let now = Utc::now();
        let matter = Matter {
            id: new.id,
            user_id: new.user_id,
            puuid: new.puuid,
            dir: false,
            privacy: new.privacy,
            name: new.name,
            size: new.size,
            path: new.path,
            created_at: now,
            updated_at: now,
        };
        matters.insert(matter.id, matter.clone());
        Ok(matter)
    }
}

/// Mock upload token store
#[derive(Clone, Default)]
pub struct MockUploadTokenStore {
    tokens: Arc<Mutex<HashMap<Uuid, UploadToken>>>,
    fail_binds: Arc<AtomicBool>,
}

impl MockUploadTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&self, token: UploadToken) {
        self.tokens.lock().unwrap().insert(token.id, token);
    }

    /// Make every following `bind_matter` fail with a database-style error
    pub fn fail_binds(&self, fail: bool) {
        self.fail_binds.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UploadTokenStore for MockUploadTokenStore {
    async fn create(&self, new: NewUploadToken) -> Result<UploadToken, AppError> {
        let now = Utc::now();
        let token = UploadToken {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            folder_uuid: new.folder_uuid,
            matter_uuid: None,
            filename: new.filename,
            privacy: new.privacy,
            size: new.size,
            expire_at: new.expire_at,
            ip: new.ip,
            created_at: now,
            updated_at: now,
        };
        self.add_token(token.clone());
        Ok(token)
    }

    async fn get(&self, id: Uuid) -> Result<Option<UploadToken>, AppError> {
        Ok(self.tokens.lock().unwrap().get(&id).cloned())
    }

    async fn retire(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<UploadToken>, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get_mut(&id) {
            Some(token) if token.expire_at > now => {
                token.expire_at = new_expire_at;
                token.updated_at = Utc::now();
                Ok(Some(token.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn restore(
        &self,
        id: Uuid,
        retired_at: DateTime<Utc>,
        original_expire_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get_mut(&id) {
            Some(token) if token.expire_at == retired_at => {
                token.expire_at = original_expire_at;
                token.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn bind_matter(&self, id: Uuid, matter_id: Uuid) -> Result<(), AppError> {
        if self.fail_binds.load(Ordering::SeqCst) {
            return Err(AppError::Internal("mock upload token store refused update".to_string()));
        }
        if let Some(token) = self.tokens.lock().unwrap().get_mut(&id) {
            token.matter_uuid = Some(matter_id);
        }
        Ok(())
    }
}

/// Mock download token store
#[derive(Clone, Default)]
pub struct MockDownloadTokenStore {
    tokens: Arc<Mutex<HashMap<Uuid, DownloadToken>>>,
}

impl MockDownloadTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&self, token: DownloadToken) {
        self.tokens.lock().unwrap().insert(token.id, token);
    }
}

#[async_trait]
impl DownloadTokenStore for MockDownloadTokenStore {
    async fn create(&self, new: NewDownloadToken) -> Result<DownloadToken, AppError> {
        let now = Utc::now();
        let token = DownloadToken {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            matter_uuid: new.matter_uuid,
            expire_at: new.expire_at,
            consumed_at: None,
            ip: new.ip,
            created_at: now,
            updated_at: now,
        };
        self.add_token(token.clone());
        Ok(token)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DownloadToken>, AppError> {
        Ok(self.tokens.lock().unwrap().get(&id).cloned())
    }

    async fn consume(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<DownloadToken>, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get_mut(&id) {
            Some(token) if token.expire_at > now && token.consumed_at.is_none() => {
                token.expire_at = new_expire_at;
                token.consumed_at = Some(now);
                token.updated_at = Utc::now();
                Ok(Some(token.clone()))
            }
            _ => Ok(None),
        }
    }
}

/// Mock image cache store
#[derive(Clone, Default)]
pub struct MockImageCacheStore {
    caches: Arc<Mutex<HashMap<String, ImageCache>>>,
}

impl MockImageCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.caches.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageCacheStore for MockImageCacheStore {
    async fn find_by_uri(&self, uri: &str) -> Result<Option<ImageCache>, AppError> {
        Ok(self.caches.lock().unwrap().get(uri).cloned())
    }

    async fn create(&self, new: NewImageCache) -> Result<ImageCache, AppError> {
        let mut caches = self.caches.lock().unwrap();
        let cache = caches
            .entry(new.uri.clone())
            .or_insert_with(|| ImageCache {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                matter_uuid: new.matter_uuid,
                mode: new.mode,
                uri: new.uri,
                path: new.path,
                size: new.size,
                created_at: Utc::now(),
            })
            .clone();
        Ok(cache)
    }
}
