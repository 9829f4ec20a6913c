use chrono::{DateTime, Utc};
use ferry_core::{
    models::{NewUploadToken, UploadToken},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const UPLOAD_TOKEN_COLUMNS: &str = "id, user_id, folder_uuid, matter_uuid, filename, privacy, size, expire_at, ip, created_at, updated_at";

/// Repository for upload capabilities
#[derive(Clone)]
pub struct UploadTokenRepository {
    pool: PgPool,
}

impl UploadTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_tokens", db.operation = "insert"))]
    pub async fn create_token(&self, new: NewUploadToken) -> Result<UploadToken, AppError> {
        let token = sqlx::query_as::<Postgres, UploadToken>(&format!(
            r#"
            INSERT INTO upload_tokens (id, user_id, folder_uuid, filename, privacy, size, expire_at, ip)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            UPLOAD_TOKEN_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.folder_uuid)
        .bind(&new.filename)
        .bind(new.privacy)
        .bind(new.size)
        .bind(new.expire_at)
        .bind(&new.ip)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_tokens", db.operation = "select", db.record_id = %id))]
    pub async fn get_token(&self, id: Uuid) -> Result<Option<UploadToken>, AppError> {
        let token = sqlx::query_as::<Postgres, UploadToken>(&format!(
            "SELECT {} FROM upload_tokens WHERE id = $1",
            UPLOAD_TOKEN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    /// Set the expiry to `new_expire_at` only while the token is still live at `now`.
    ///
    /// Returns the updated token, or `None` when the token is unknown or already dead.
    #[tracing::instrument(skip(self), fields(db.table = "upload_tokens", db.operation = "update", db.record_id = %id))]
    pub async fn retire_token(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        new_expire_at: DateTime<Utc>,
    ) -> Result<Option<UploadToken>, AppError> {
        let token = sqlx::query_as::<Postgres, UploadToken>(&format!(
            r#"
            UPDATE upload_tokens
            SET expire_at = $3, updated_at = NOW()
            WHERE id = $1 AND expire_at > $2
            RETURNING {}
            "#,
            UPLOAD_TOKEN_COLUMNS
        ))
        .bind(id)
        .bind(now)
        .bind(new_expire_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    /// Put back `original_expire_at` if the expiry still equals `retired_at`.
    #[tracing::instrument(skip(self), fields(db.table = "upload_tokens", db.operation = "update", db.record_id = %id))]
    pub async fn restore_token(
        &self,
        id: Uuid,
        retired_at: DateTime<Utc>,
        original_expire_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE upload_tokens
            SET expire_at = $3, updated_at = NOW()
            WHERE id = $1 AND expire_at = $2
            "#,
        )
        .bind(id)
        .bind(retired_at)
        .bind(original_expire_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Remember which matter a consumed token produced
    #[tracing::instrument(skip(self), fields(db.table = "upload_tokens", db.operation = "update", db.record_id = %id))]
    pub async fn bind_matter(&self, id: Uuid, matter_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE upload_tokens SET matter_uuid = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(matter_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
