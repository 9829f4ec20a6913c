//! Liveness check shared by every capability token

use chrono::{DateTime, Utc};
use ferry_core::models::Capability;
use ferry_core::AppError;
use std::future::Future;
use uuid::Uuid;

/// Why a presented token id was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No id was presented
    Missing,
    /// The id is malformed or names no token
    Unknown,
    /// The token exists but `now >= expire_at`
    Expired,
}

impl Rejection {
    pub fn into_app_error(self, kind: &str) -> AppError {
        match self {
            Rejection::Missing => AppError::InvalidInput(format!("{} is required", kind)),
            Rejection::Unknown => AppError::NotFound(format!("{} is invalid", kind)),
            Rejection::Expired => AppError::Expired(format!("{} has expired", kind)),
        }
    }
}

/// Validates presented token ids. Never mutates the token.
pub struct CapabilityValidator;

impl CapabilityValidator {
    /// Parse a presented id; empty is `Missing`, malformed is `Unknown`
    pub fn parse_id(raw: &str) -> Result<Uuid, Rejection> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Rejection::Missing);
        }
        Uuid::parse_str(raw).map_err(|_| Rejection::Unknown)
    }

    /// Decide on a looked-up token
    pub fn check<T: Capability>(found: Option<T>, now: DateTime<Utc>) -> Result<T, Rejection> {
        match found {
            None => Err(Rejection::Unknown),
            Some(token) if token.is_live_at(now) => Ok(token),
            Some(_) => Err(Rejection::Expired),
        }
    }

    /// Parse `raw`, look the token up with `lookup` and check it is live at `now`.
    pub async fn validate<T, F, Fut>(
        raw: &str,
        now: DateTime<Utc>,
        lookup: F,
    ) -> Result<T, AppError>
    where
        T: Capability,
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<Option<T>, AppError>>,
    {
        let id = Self::parse_id(raw).map_err(|r| r.into_app_error(T::KIND))?;
        let found = lookup(id).await?;
        Self::check(found, now).map_err(|r| {
            tracing::debug!(token_id = %id, kind = T::KIND, rejection = ?r, "Token rejected");
            r.into_app_error(T::KIND)
        })
    }
}
