use chrono::{DateTime, Utc};
use ferry_core::{
    models::{DownloadToken, NewDownloadToken},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const DOWNLOAD_TOKEN_COLUMNS: &str =
    "id, user_id, matter_uuid, expire_at, consumed_at, ip, created_at, updated_at";

/// Repository for download capabilities
#[derive(Clone)]
pub struct DownloadTokenRepository {
    pool: PgPool,
}

impl DownloadTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "download_tokens", db.operation = "insert"))]
    pub async fn create_token(&self, new: NewDownloadToken) -> Result<DownloadToken, AppError> {
        let token = sqlx::query_as::<Postgres, DownloadToken>(&format!(
            r#"
            INSERT INTO download_tokens (id, user_id, matter_uuid, expire_at, ip)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            DOWNLOAD_TOKEN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.matter_uuid)
        .bind(new.expire_at)
        .bind(&new.ip)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    #[tracing::instrument(skip(self), fields(db.table = "download_tokens", db.operation = "select", db.record_id = %id))]
    pub async fn get_token(&self, id: Uuid) -> Result<Option<DownloadToken>, AppError> {
        let token = sqlx::query_as::<Postgres, DownloadToken>(&format!(
            "SELECT {} FROM download_tokens WHERE id = $1",
            DOWNLOAD_TOKEN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    /// Record the first authorized use: set `consumed_at = now` and the expiry to
    /// `new_expire_at`, only if the token is live at `now` and was never consumed.
    #[tracing::instrument(skip(self), fields(db.table = "download_tokens", db.operation = "update", db.record_id = %id))]
    pub async fn consume_token(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<DownloadToken>, AppError> {
        let token = sqlx::query_as::<Postgres, DownloadToken>(&format!(
            r#"
            UPDATE download_tokens
            SET expire_at = $3, consumed_at = $2, updated_at = NOW()
            WHERE id = $1 AND expire_at > $2 AND consumed_at IS NULL
            RETURNING {}
            "#,
            DOWNLOAD_TOKEN_COLUMNS
        ))
        .bind(id)
        .bind(now)
        .bind(new_expire_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }
}
