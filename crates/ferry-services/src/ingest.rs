//! Storing new files and resolving folder paths

use bytes::Bytes;
use ferry_core::models::{Matter, NewMatter};
use ferry_core::AppError;
use ferry_db::MatterStore;
use ferry_storage::{matter_key, Storage};
use std::sync::Arc;
use uuid::Uuid;

/// Writes file bytes to storage and records the matter
#[derive(Clone)]
pub struct MatterIngestor {
    matters: Arc<dyn MatterStore>,
    storage: Arc<dyn Storage>,
}

impl MatterIngestor {
    pub fn new(matters: Arc<dyn MatterStore>, storage: Arc<dyn Storage>) -> Self {
        Self { matters, storage }
    }

    /// Resolve a slash-separated folder path owned by `user_id`.
    ///
    /// `""` and `"/"` are the root (`None`); every segment must name an
    /// existing directory.
    pub async fn resolve_dir(&self, user_id: Uuid, dir: &str) -> Result<Option<Uuid>, AppError> {
        let mut current: Option<Uuid> = None;

        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            let folder = self
                .matters
                .find_child(user_id, current, segment, true)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Folder '{}' does not exist", dir)))?;
            current = Some(folder.id);
        }

        Ok(current)
    }

    /// Store `data` as a new file named `filename` in `folder`.
    ///
    /// Bytes written before a failed insert are removed again.
    #[tracing::instrument(skip(self, data), fields(user_id = %user_id, filename = %filename, size = data.len()))]
    pub async fn ingest(
        &self,
        user_id: Uuid,
        folder: Option<Uuid>,
        filename: &str,
        privacy: bool,
        data: Bytes,
    ) -> Result<Matter, AppError> {
        if self
            .matters
            .find_child(user_id, folder, filename, false)
            .await?
            .is_some()
        {
            return Err(AppError::InvalidInput(format!(
                "A file named '{}' already exists in this folder",
                filename
            )));
        }

        let id = Uuid::new_v4();
        let key = matter_key(user_id, id, filename);
        let size = self.storage.put(&key, data).await?;

        let created = self
            .matters
            .create(NewMatter {
                id,
                user_id,
                puuid: folder,
                name: filename.to_string(),
                size: size as i64,
                privacy,
                path: key.clone(),
            })
            .await;

        match created {
            Ok(matter) => {
                tracing::info!(matter_id = %matter.id, key = %key, "Matter stored");
                Ok(matter)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphaned bytes");
                }
                Err(e)
            }
        }
    }
}
