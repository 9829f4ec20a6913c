use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::transform::ResizeMode;

/// A materialized resize of a stored image, keyed by the request URI that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ImageCache {
    pub id: Uuid,
    pub user_id: Uuid,
    pub matter_uuid: Uuid,
    pub mode: ResizeMode,
    pub uri: String,
    pub path: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewImageCache {
    pub user_id: Uuid,
    pub matter_uuid: Uuid,
    pub mode: ResizeMode,
    pub uri: String,
    pub path: String,
    pub size: i64,
}
