//! Creating upload and download capabilities

use chrono::{DateTime, Duration, Utc};
use ferry_core::models::{
    DownloadToken, NewDownloadToken, NewUploadToken, UploadToken, User,
};
use ferry_core::validation::validate_filename;
use ferry_core::AppError;
use ferry_db::{DownloadTokenStore, MatterStore, UploadTokenStore};
use std::sync::Arc;
use uuid::Uuid;

fn expiry(now: DateTime<Utc>, expire_secs: i64) -> Result<DateTime<Utc>, AppError> {
    if expire_secs < 1 {
        return Err(AppError::InvalidInput(
            "expire must be a positive number of seconds".to_string(),
        ));
    }
    Duration::try_seconds(expire_secs)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(|| AppError::InvalidInput("expire is too large".to_string()))
}

/// Binding of a new upload capability
#[derive(Debug, Clone)]
pub struct UploadGrantRequest {
    pub folder: Option<Uuid>,
    pub filename: String,
    pub size: i64,
    pub privacy: bool,
    pub expire_secs: i64,
    pub ip: String,
}

/// Issues upload tokens
#[derive(Clone)]
pub struct UploadTokenIssuer {
    tokens: Arc<dyn UploadTokenStore>,
}

impl UploadTokenIssuer {
    pub fn new(tokens: Arc<dyn UploadTokenStore>) -> Self {
        Self { tokens }
    }

    #[tracing::instrument(skip(self, owner), fields(user_id = %owner.id, filename = %request.filename))]
    pub async fn issue(
        &self,
        owner: &User,
        request: UploadGrantRequest,
        now: DateTime<Utc>,
    ) -> Result<UploadToken, AppError> {
        validate_filename(&request.filename)?;
        if request.size < 1 {
            return Err(AppError::InvalidInput(
                "size must be a positive integer".to_string(),
            ));
        }

        let token = self
            .tokens
            .create(NewUploadToken {
                user_id: owner.id,
                folder_uuid: request.folder,
                filename: request.filename,
                privacy: request.privacy,
                size: request.size,
                expire_at: expiry(now, request.expire_secs)?,
                ip: request.ip,
            })
            .await?;

        tracing::info!(token_id = %token.id, expire_at = %token.expire_at, "Upload token issued");
        Ok(token)
    }
}

/// Issues download tokens for files the caller owns
#[derive(Clone)]
pub struct DownloadTokenIssuer {
    tokens: Arc<dyn DownloadTokenStore>,
    matters: Arc<dyn MatterStore>,
}

impl DownloadTokenIssuer {
    pub fn new(tokens: Arc<dyn DownloadTokenStore>, matters: Arc<dyn MatterStore>) -> Self {
        Self { tokens, matters }
    }

    #[tracing::instrument(skip(self, owner), fields(user_id = %owner.id, matter_id = %matter_id))]
    pub async fn issue(
        &self,
        owner: &User,
        matter_id: Uuid,
        expire_secs: i64,
        ip: String,
        now: DateTime<Utc>,
    ) -> Result<DownloadToken, AppError> {
        let matter = self
            .matters
            .get(matter_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Matter {} not found", matter_id)))?;

        if matter.user_id != owner.id {
            return Err(AppError::OwnershipMismatch(
                "The file does not belong to you".to_string(),
            ));
        }
        if matter.dir {
            return Err(AppError::InvalidInput(
                "Directories cannot be downloaded".to_string(),
            ));
        }

        let token = self
            .tokens
            .create(NewDownloadToken {
                user_id: owner.id,
                matter_uuid: matter.id,
                expire_at: expiry(now, expire_secs)?,
                ip,
            })
            .await?;

        tracing::info!(token_id = %token.id, expire_at = %token.expire_at, "Download token issued");
        Ok(token)
    }
}
