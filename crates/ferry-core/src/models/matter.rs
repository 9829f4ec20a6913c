use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored file or a directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Matter {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Containing folder; `None` for the owner's root
    pub puuid: Option<Uuid>,
    pub dir: bool,
    pub privacy: bool,
    pub name: String,
    pub size: i64,
    /// Storage key relative to the storage root; empty for directories
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to record a freshly ingested file
#[derive(Debug, Clone)]
pub struct NewMatter {
    /// Chosen before the bytes are written so the storage key can embed it
    pub id: Uuid,
    pub user_id: Uuid,
    pub puuid: Option<Uuid>,
    pub name: String,
    pub size: i64,
    pub privacy: bool,
    pub path: String,
}
