use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::Capability;

/// Single-use capability to upload (or crawl) one named file into a folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UploadToken {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Target folder; `None` uploads into the owner's root
    pub folder_uuid: Option<Uuid>,
    /// Filled in once an upload or crawl with this token has succeeded
    pub matter_uuid: Option<Uuid>,
    pub filename: String,
    pub privacy: bool,
    pub size: i64,
    pub expire_at: DateTime<Utc>,
    pub ip: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Capability for UploadToken {
    const KIND: &'static str = "upload token";

    fn id(&self) -> Uuid {
        self.id
    }

    fn expire_at(&self) -> DateTime<Utc> {
        self.expire_at
    }
}

/// Binding fields of an upload token about to be issued
#[derive(Debug, Clone)]
pub struct NewUploadToken {
    pub user_id: Uuid,
    pub folder_uuid: Option<Uuid>,
    pub filename: String,
    pub privacy: bool,
    pub size: i64,
    pub expire_at: DateTime<Utc>,
    pub ip: String,
}

/// Form accepted by `POST /api/alien/fetch/upload/token`
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct IssueUploadTokenForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "filename is required"),
        custom(function = "crate::validation::validate_filename_chars")
    )]
    pub filename: String,
    /// Lifetime in seconds; defaults to one day
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_expire_secs"))]
    pub expire: Option<String>,
    /// `"true"` or `"false"`
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_privacy_literal"))]
    pub privacy: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_positive_size"))]
    pub size: String,
    /// Slash-separated folder path, `/` for the root
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Form accepted by `POST /api/alien/crawl/token`
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CrawlTokenForm {
    #[serde(default, rename = "uploadTokenUuid")]
    #[validate(length(min = 1, message = "uploadTokenUuid is required"))]
    pub upload_token_uuid: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_http_url"))]
    pub url: String,
}

/// Form accepted by `POST /api/alien/crawl/direct`
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CrawlDirectForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "filename is required"),
        custom(function = "crate::validation::validate_filename_chars")
    )]
    pub filename: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_http_url"))]
    pub url: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_privacy_literal"))]
    pub privacy: String,
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Form accepted by `POST /api/alien/confirm`
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ConfirmForm {
    #[serde(default, rename = "matterUuid")]
    #[validate(custom(function = "crate::validation::validate_uuid_literal"))]
    pub matter_uuid: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}
