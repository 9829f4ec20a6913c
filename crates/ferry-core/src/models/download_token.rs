use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::Capability;

/// Capability to download one matter while unexpired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DownloadToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub matter_uuid: Uuid,
    pub expire_at: DateTime<Utc>,
    /// First authorized download; from then on the token only decays
    pub consumed_at: Option<DateTime<Utc>>,
    pub ip: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Capability for DownloadToken {
    const KIND: &'static str = "download token";

    fn id(&self) -> Uuid {
        self.id
    }

    fn expire_at(&self) -> DateTime<Utc> {
        self.expire_at
    }
}

#[derive(Debug, Clone)]
pub struct NewDownloadToken {
    pub user_id: Uuid,
    pub matter_uuid: Uuid,
    pub expire_at: DateTime<Utc>,
    pub ip: String,
}

/// Form accepted by `POST /api/alien/fetch/download/token`
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct IssueDownloadTokenForm {
    #[serde(default, rename = "matterUuid")]
    #[validate(custom(function = "crate::validation::validate_uuid_literal"))]
    pub matter_uuid: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_expire_secs"))]
    pub expire: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}
