use ferry_core::{
    models::{ImageCache, NewImageCache},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const IMAGE_CACHE_COLUMNS: &str = "id, user_id, matter_uuid, mode, uri, path, size, created_at";

/// Repository for materialized image artifacts
#[derive(Clone)]
pub struct ImageCacheRepository {
    pool: PgPool,
}

impl ImageCacheRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "image_caches", db.operation = "select"))]
    pub async fn find_by_uri(&self, uri: &str) -> Result<Option<ImageCache>, AppError> {
        let cache = sqlx::query_as::<Postgres, ImageCache>(&format!(
            "SELECT {} FROM image_caches WHERE uri = $1",
            IMAGE_CACHE_COLUMNS
        ))
        .bind(uri)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cache)
    }

    /// Insert a cache record; when another request already recorded the same
    /// URI, that record is returned instead.
    #[tracing::instrument(skip(self), fields(db.table = "image_caches", db.operation = "insert"))]
    pub async fn create_cache(&self, new: NewImageCache) -> Result<ImageCache, AppError> {
        let inserted = sqlx::query_as::<Postgres, ImageCache>(&format!(
            r#"
            INSERT INTO image_caches (id, user_id, matter_uuid, mode, uri, path, size)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (uri) DO NOTHING
            RETURNING {}
            "#,
            IMAGE_CACHE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.matter_uuid)
        .bind(new.mode)
        .bind(&new.uri)
        .bind(&new.path)
        .bind(new.size)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(cache) => Ok(cache),
            None => self.find_by_uri(&new.uri).await?.ok_or_else(|| {
                AppError::Internal(format!("Image cache for '{}' vanished after conflict", new.uri))
            }),
        }
    }
}
