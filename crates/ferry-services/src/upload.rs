//! Consuming upload tokens: direct multipart uploads and crawls
//!
//! A token is claimed with a compare-and-retire before any bytes are
//! ingested. If ingestion fails afterwards the claim is released again, so a
//! failed attempt never burns the token and two racing attempts never both
//! create a file.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use ferry_core::models::{Capability, Matter, UploadToken, User};
use ferry_core::validation::{validate_crawl_url, validate_filename};
use ferry_core::AppError;
use ferry_db::{MatterStore, UploadTokenStore, UserStore};
use std::sync::Arc;
use uuid::Uuid;

use crate::capability::{CapabilityValidator, Rejection};
use crate::crawl::RemoteFetcher;
use crate::ingest::MatterIngestor;

#[derive(Clone)]
pub struct UploadService {
    tokens: Arc<dyn UploadTokenStore>,
    users: Arc<dyn UserStore>,
    matters: Arc<dyn MatterStore>,
    ingestor: MatterIngestor,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl UploadService {
    pub fn new(
        tokens: Arc<dyn UploadTokenStore>,
        users: Arc<dyn UserStore>,
        matters: Arc<dyn MatterStore>,
        ingestor: MatterIngestor,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        Self {
            tokens,
            users,
            matters,
            ingestor,
            fetcher,
        }
    }

    pub fn ingestor(&self) -> &MatterIngestor {
        &self.ingestor
    }

    async fn validate(&self, raw_token: &str, now: DateTime<Utc>) -> Result<UploadToken, AppError> {
        let tokens = self.tokens.clone();
        CapabilityValidator::validate(raw_token, now, |id| async move { tokens.get(id).await })
            .await
    }

    async fn owner_of(&self, token: &UploadToken) -> Result<User, AppError> {
        self.users.get(token.user_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Owner of upload token {} no longer exists", token.id))
        })
    }

    /// Retire the token at `now`; losing the race reads as expiry
    async fn claim(&self, token: &UploadToken, now: DateTime<Utc>) -> Result<UploadToken, AppError> {
        match self.tokens.retire(token.id, now, now).await? {
            Some(claimed) => Ok(claimed),
            None => {
                tracing::debug!(token_id = %token.id, "Upload token claimed by another request");
                Err(Rejection::Expired.into_app_error(UploadToken::KIND))
            }
        }
    }

    /// Bind the new file on success, hand the token back on failure
    async fn settle(
        &self,
        original: &UploadToken,
        claimed: &UploadToken,
        outcome: Result<Matter, AppError>,
    ) -> Result<Matter, AppError> {
        match outcome {
            Ok(matter) => {
                // The file is stored and the token already retired; a missing
                // binding only loses the token-to-file link
                if let Err(bind_err) = self.tokens.bind_matter(original.id, matter.id).await {
                    tracing::warn!(
                        token_id = %original.id,
                        matter_id = %matter.id,
                        error = %bind_err,
                        "Failed to bind upload token to its file"
                    );
                }
                tracing::info!(
                    token_id = %original.id,
                    matter_id = %matter.id,
                    user_id = %matter.user_id,
                    "Upload token consumed"
                );
                Ok(matter)
            }
            Err(e) => {
                match self
                    .tokens
                    .restore(original.id, claimed.expire_at, original.expire_at)
                    .await
                {
                    Ok(true) => {
                        tracing::debug!(token_id = %original.id, "Upload token released after failed ingest")
                    }
                    Ok(false) => {
                        tracing::warn!(token_id = %original.id, "Upload token changed while claimed, not released")
                    }
                    Err(restore_err) => {
                        tracing::error!(token_id = %original.id, error = %restore_err, "Failed to release upload token")
                    }
                }
                Err(e)
            }
        }
    }

    /// Store a multipart upload against an upload token.
    ///
    /// The part's filename and length must match what the token was issued for.
    #[tracing::instrument(skip(self, raw_token, data), fields(filename = %filename, size = data.len()))]
    pub async fn consume_upload(
        &self,
        raw_token: &str,
        filename: &str,
        data: Bytes,
        now: DateTime<Utc>,
    ) -> Result<Matter, AppError> {
        let token = self.validate(raw_token, now).await?;

        if filename != token.filename {
            return Err(AppError::Integrity(format!(
                "Filename '{}' does not match the token's '{}'",
                filename, token.filename
            )));
        }
        if data.len() as i64 != token.size {
            return Err(AppError::Integrity(format!(
                "File size {} does not match the token's {}",
                data.len(),
                token.size
            )));
        }

        let owner = self.owner_of(&token).await?;
        let claimed = self.claim(&token, now).await?;

        let outcome = self
            .ingestor
            .ingest(owner.id, token.folder_uuid, &token.filename, token.privacy, data)
            .await;

        self.settle(&token, &claimed, outcome).await
    }

    /// Fetch `url` into the file an upload token was issued for
    #[tracing::instrument(skip(self, raw_token))]
    pub async fn consume_crawl(
        &self,
        raw_token: &str,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Matter, AppError> {
        let token = self.validate(raw_token, now).await?;
        validate_crawl_url(url)?;

        let owner = self.owner_of(&token).await?;
        let claimed = self.claim(&token, now).await?;

        let outcome = match self.fetcher.fetch(url).await {
            Ok(data) => {
                self.ingestor
                    .ingest(owner.id, token.folder_uuid, &token.filename, token.privacy, data)
                    .await
            }
            Err(e) => Err(e),
        };

        self.settle(&token, &claimed, outcome).await
    }

    /// Crawl on the caller's own credentials, no token involved
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn crawl_direct(
        &self,
        user: &User,
        filename: &str,
        url: &str,
        privacy: bool,
        dir: &str,
    ) -> Result<Matter, AppError> {
        validate_filename(filename)?;
        validate_crawl_url(url)?;

        let folder = self.ingestor.resolve_dir(user.id, dir).await?;
        let data = self.fetcher.fetch(url).await?;

        self.ingestor
            .ingest(user.id, folder, filename, privacy, data)
            .await
    }

    /// Look up a file the caller owns, used to confirm a delegated upload landed
    pub async fn confirm(&self, user: &User, matter_id: Uuid) -> Result<Matter, AppError> {
        let matter = self
            .matters
            .get(matter_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Matter {} not found", matter_id)))?;

        if matter.user_id != user.id {
            return Err(AppError::OwnershipMismatch(
                "The file does not belong to you".to_string(),
            ));
        }

        Ok(matter)
    }
}
