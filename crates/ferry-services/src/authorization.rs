//! Download authorization
//!
//! [`authorize`] is the whole decision as a pure function over the file, the
//! requested name and a [`DownloadGrant`]. [`DownloadAuthorizer`] does the I/O
//! around it: re-reading the file and validating a presented token, then
//! retiring the token once the download has actually been served.

use chrono::{DateTime, Duration, Utc};
use ferry_core::constants::DOWNLOAD_TOKEN_GRACE_SECS;
use ferry_core::models::{Capability, DownloadToken, Matter, User};
use ferry_core::AppError;
use ferry_db::{DownloadTokenStore, MatterStore};
use std::sync::Arc;
use uuid::Uuid;

use crate::capability::{CapabilityValidator, Rejection};

/// What the requester brought along
#[derive(Debug, Clone)]
pub enum DownloadGrant {
    ByToken(DownloadToken),
    BySession(User),
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Directory,
    NameMismatch,
    TokenExpired,
    TokenForOtherMatter,
    /// The file changed hands after the token was issued
    TokenOwnerChanged,
    NoSession,
    NotOwner,
}

impl DenyReason {
    pub fn into_app_error(self) -> AppError {
        match self {
            DenyReason::Directory => {
                AppError::InvalidInput("Directories cannot be downloaded".to_string())
            }
            DenyReason::NameMismatch => {
                AppError::Integrity("Requested filename does not match the file".to_string())
            }
            DenyReason::TokenExpired => Rejection::Expired.into_app_error(DownloadToken::KIND),
            DenyReason::TokenForOtherMatter => AppError::OwnershipMismatch(
                "Download token was not issued for this file".to_string(),
            ),
            DenyReason::TokenOwnerChanged => AppError::OwnershipMismatch(
                "Download token issuer no longer owns this file".to_string(),
            ),
            DenyReason::NoSession => {
                AppError::Unauthorized("Login or a download token is required".to_string())
            }
            DenyReason::NotOwner => {
                AppError::Unauthorized("You are not allowed to download this file".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied(reason) => Err(reason.into_app_error()),
        }
    }
}

/// Checks that hold whatever the requester presents
fn structural(matter: &Matter, requested_name: &str) -> Option<Decision> {
    if matter.dir {
        Some(Decision::Denied(DenyReason::Directory))
    } else if matter.name != requested_name {
        Some(Decision::Denied(DenyReason::NameMismatch))
    } else if !matter.privacy {
        Some(Decision::Allowed)
    } else {
        None
    }
}

/// Decide whether `grant` may download `matter` as `requested_name` at `now`.
pub fn authorize(
    matter: &Matter,
    requested_name: &str,
    grant: &DownloadGrant,
    now: DateTime<Utc>,
) -> Decision {
    if let Some(decision) = structural(matter, requested_name) {
        return decision;
    }

    match grant {
        DownloadGrant::ByToken(token) => {
            if !token.is_live_at(now) {
                Decision::Denied(DenyReason::TokenExpired)
            } else if token.matter_uuid != matter.id {
                Decision::Denied(DenyReason::TokenForOtherMatter)
            } else if token.user_id != matter.user_id {
                Decision::Denied(DenyReason::TokenOwnerChanged)
            } else {
                Decision::Allowed
            }
        }
        DownloadGrant::BySession(user) => {
            if user.is_admin() || user.id == matter.user_id {
                Decision::Allowed
            } else {
                Decision::Denied(DenyReason::NotOwner)
            }
        }
        DownloadGrant::Anonymous => Decision::Denied(DenyReason::NoSession),
    }
}

/// A download that passed authorization but has not been served yet
#[derive(Debug, Clone)]
pub struct AuthorizedDownload {
    pub matter: Matter,
    /// Token still to be retired once the download has been served
    pending_token: Option<DownloadToken>,
}

#[derive(Clone)]
pub struct DownloadAuthorizer {
    matters: Arc<dyn MatterStore>,
    tokens: Arc<dyn DownloadTokenStore>,
}

impl DownloadAuthorizer {
    pub fn new(matters: Arc<dyn MatterStore>, tokens: Arc<dyn DownloadTokenStore>) -> Self {
        Self { matters, tokens }
    }

    /// Load the file and decide on the request. Never mutates the token.
    ///
    /// A presented token is only looked at for private files, and takes
    /// precedence over the session. Call [`Self::complete`] once the bytes
    /// are ready to be served.
    #[tracing::instrument(skip(self, raw_token, session), fields(has_token = raw_token.is_some(), has_session = session.is_some()))]
    pub async fn authorize_download(
        &self,
        matter_id: Uuid,
        requested_name: &str,
        raw_token: Option<&str>,
        session: Option<User>,
        now: DateTime<Utc>,
    ) -> Result<AuthorizedDownload, AppError> {
        let matter = self
            .matters
            .get(matter_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Matter {} not found", matter_id)))?;

        if let Some(decision) = structural(&matter, requested_name) {
            decision.into_result()?;
            return Ok(AuthorizedDownload {
                matter,
                pending_token: None,
            });
        }

        let grant = match raw_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(raw) => {
                let tokens = self.tokens.clone();
                let token = CapabilityValidator::validate(raw, now, |id| async move {
                    tokens.get(id).await
                })
                .await?;
                DownloadGrant::ByToken(token)
            }
            None => session.map_or(DownloadGrant::Anonymous, DownloadGrant::BySession),
        };

        let decision = authorize(&matter, requested_name, &grant, now);
        if let Decision::Denied(reason) = decision {
            tracing::debug!(matter_id = %matter.id, reason = ?reason, "Download denied");
            return Err(reason.into_app_error());
        }

        let pending_token = match grant {
            DownloadGrant::ByToken(token) if token.consumed_at.is_none() => Some(token),
            _ => None,
        };

        Ok(AuthorizedDownload {
            matter,
            pending_token,
        })
    }

    /// Retire the presenting token on its first served use: the expiry moves
    /// to one day after `now`.
    pub async fn complete(
        &self,
        authorized: &AuthorizedDownload,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let Some(token) = &authorized.pending_token else {
            return Ok(());
        };

        let grace = Duration::seconds(DOWNLOAD_TOKEN_GRACE_SECS);
        if let Some(retired) = self.tokens.consume(token.id, now, now + grace).await? {
            tracing::info!(token_id = %token.id, expire_at = %retired.expire_at, "Download token retired");
            return Ok(());
        }

        // Another request got there first; its window decides
        let current = self.tokens.get(token.id).await?;
        CapabilityValidator::check(current, now)
            .map(|_| ())
            .map_err(|r| r.into_app_error(DownloadToken::KIND))
    }
}
