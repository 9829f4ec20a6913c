use ferry_core::{
    models::{Matter, NewMatter},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const MATTER_COLUMNS: &str =
    "id, user_id, puuid, dir, privacy, name, size, path, created_at, updated_at";

/// Repository for files and directories
#[derive(Clone)]
pub struct MatterRepository {
    pool: PgPool,
}

impl MatterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "matters", db.operation = "select", db.record_id = %id))]
    pub async fn get_matter(&self, id: Uuid) -> Result<Option<Matter>, AppError> {
        let matter = sqlx::query_as::<Postgres, Matter>(&format!(
            "SELECT {} FROM matters WHERE id = $1",
            MATTER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(matter)
    }

    /// Find a direct child of `puuid` (root when `None`) by name and kind
    #[tracing::instrument(skip(self), fields(db.table = "matters", db.operation = "select"))]
    pub async fn find_child(
        &self,
        user_id: Uuid,
        puuid: Option<Uuid>,
        name: &str,
        dir: bool,
    ) -> Result<Option<Matter>, AppError> {
        let matter = sqlx::query_as::<Postgres, Matter>(&format!(
            "SELECT {} FROM matters WHERE user_id = $1 AND puuid IS NOT DISTINCT FROM $2 AND name = $3 AND dir = $4",
            MATTER_COLUMNS
        ))
        .bind(user_id)
        .bind(puuid)
        .bind(name)
        .bind(dir)
        .fetch_optional(&self.pool)
        .await?;

        Ok(matter)
    }

    /// Record a newly stored file
    #[tracing::instrument(skip(self), fields(db.table = "matters", db.operation = "insert", db.record_id = %new.id))]
    pub async fn create_matter(&self, new: NewMatter) -> Result<Matter, AppError> {
        let matter = sqlx::query_as::<Postgres, Matter>(&format!(
            r#"
            INSERT INTO matters (id, user_id, puuid, dir, privacy, name, size, path)
            VALUES ($1, $2, $3, FALSE, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MATTER_COLUMNS
        ))
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.puuid)
        .bind(new.privacy)
        .bind(&new.name)
        .bind(new.size)
        .bind(&new.path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::InvalidInput(
                format!("A file named '{}' already exists in this folder", new.name),
            ),
            other => AppError::Database(other),
        })?;

        Ok(matter)
    }
}
