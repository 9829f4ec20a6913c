//! Lazy cache of resized images
//!
//! The cache key is the download request's path and query verbatim. A hit
//! returns the stored artifact; a miss resizes the original on a blocking
//! thread, writes the artifact and records it. The artifact key is derived
//! from the request URI and writes are atomic, so two concurrent misses on
//! one URI leave a single intact artifact behind.

use bytes::Bytes;
use ferry_core::models::{Matter, NewImageCache};
use ferry_core::{AppError, ResizeParams};
use ferry_db::ImageCacheStore;
use ferry_processing::ImageTransformer;
use ferry_storage::{artifact_key, Storage};
use std::sync::Arc;

/// Bytes produced from an original file
#[derive(Debug, Clone)]
pub struct Artifact {
    pub data: Bytes,
    pub extension: &'static str,
    pub content_type: &'static str,
}

/// Turns original bytes into an artifact. CPU-bound, called off the runtime.
pub trait ArtifactMaterializer: Send + Sync {
    fn materialize(&self, source: &[u8], params: &ResizeParams) -> Result<Artifact, AppError>;
}

/// Materializer backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizeMaterializer;

impl ArtifactMaterializer for ImageResizeMaterializer {
    fn materialize(&self, source: &[u8], params: &ResizeParams) -> Result<Artifact, AppError> {
        let resized = ImageTransformer::resize(source, params)
            .map_err(|e| AppError::Upstream(format!("Failed to process image: {}", e)))?;

        Ok(Artifact {
            data: resized.data,
            extension: resized.extension,
            content_type: resized.content_type,
        })
    }
}

/// Where the bytes for a download live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Storage key of the original or of the cached artifact
    pub path: String,
    /// Whether `path` is a derived artifact rather than the original
    pub transformed: bool,
}

#[derive(Clone)]
pub struct ImageCacheCoordinator {
    caches: Arc<dyn ImageCacheStore>,
    storage: Arc<dyn Storage>,
    materializer: Arc<dyn ArtifactMaterializer>,
}

impl ImageCacheCoordinator {
    pub fn new(
        caches: Arc<dyn ImageCacheStore>,
        storage: Arc<dyn Storage>,
        materializer: Arc<dyn ArtifactMaterializer>,
    ) -> Self {
        Self {
            caches,
            storage,
            materializer,
        }
    }

    /// Resolve the bytes to serve for `matter` requested as `request_uri`.
    #[tracing::instrument(skip(self, matter), fields(matter_id = %matter.id))]
    pub async fn resolve(
        &self,
        matter: &Matter,
        request_uri: &str,
        params: Option<ResizeParams>,
    ) -> Result<ResolvedArtifact, AppError> {
        let Some(params) = params else {
            return Ok(ResolvedArtifact {
                path: matter.path.clone(),
                transformed: false,
            });
        };

        if let Some(hit) = self.caches.find_by_uri(request_uri).await? {
            tracing::debug!(cache_id = %hit.id, path = %hit.path, "Image cache hit");
            return Ok(ResolvedArtifact {
                path: hit.path,
                transformed: true,
            });
        }

        tracing::debug!("Image cache miss");
        let start = std::time::Instant::now();

        let source = self.storage.get(&matter.path).await?;
        let materializer = self.materializer.clone();
        let artifact = tokio::task::spawn_blocking(move || materializer.materialize(&source, &params))
            .await
            .map_err(|e| AppError::Internal(format!("Image task failed: {}", e)))??;

        let key = artifact_key(matter.id, request_uri, artifact.extension);
        let size = self.storage.put(&key, artifact.data).await?;

        let record = self
            .caches
            .create(NewImageCache {
                user_id: matter.user_id,
                matter_uuid: matter.id,
                mode: params.mode,
                uri: request_uri.to_string(),
                path: key,
                size: size as i64,
            })
            .await?;

        tracing::info!(
            cache_id = %record.id,
            path = %record.path,
            size_bytes = size,
            content_type = artifact.content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image artifact materialized"
        );

        Ok(ResolvedArtifact {
            path: record.path,
            transformed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ferry_core::ResizeMode;
    use ferry_db::test_helpers::MockImageCacheStore;
    use ferry_storage::LocalStorage;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use uuid::Uuid;

    struct Counting {
        inner: ImageResizeMaterializer,
        calls: AtomicUsize,
    }

    impl ArtifactMaterializer for Counting {
        fn materialize(&self, source: &[u8], params: &ResizeParams) -> Result<Artifact, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.materialize(source, params)
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    async fn setup(
        source: Vec<u8>,
    ) -> (TempDir, ImageCacheCoordinator, Arc<Counting>, MockImageCacheStore, Arc<LocalStorage>, Matter) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let owner = Uuid::new_v4();
        let matter_id = Uuid::new_v4();
        let path = format!("matter/{}/{}.png", owner, matter_id);
        storage.put(&path, Bytes::from(source)).await.unwrap();

        let matter = Matter {
            id: matter_id,
            user_id: owner,
            puuid: None,
            dir: false,
            privacy: false,
            name: "photo.png".to_string(),
            size: 0,
            path,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let counting = Arc::new(Counting {
            inner: ImageResizeMaterializer,
            calls: AtomicUsize::new(0),
        });
        let caches = MockImageCacheStore::new();
        let coordinator =
            ImageCacheCoordinator::new(Arc::new(caches.clone()), storage.clone(), counting.clone());

        (dir, coordinator, counting, caches, storage, matter)
    }

    fn fill(w: u32, h: u32) -> Option<ResizeParams> {
        Some(ResizeParams::new(ResizeMode::Fill, Some(w), Some(h)).unwrap())
    }

    #[tokio::test]
    async fn test_no_params_serves_original() {
        let (_dir, coordinator, counting, caches, _storage, matter) = setup(png(8, 8)).await;

        let resolved = coordinator.resolve(&matter, "/api/alien/download/x/photo.png", None).await.unwrap();
        assert_eq!(resolved.path, matter.path);
        assert!(!resolved.transformed);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
        assert!(caches.is_empty());
    }

    #[tokio::test]
    async fn test_materializes_once_per_uri() {
        let (_dir, coordinator, counting, caches, storage, matter) = setup(png(64, 32)).await;
        let uri = "/api/alien/download/x/photo.png?ir=fill_16_16";

        let first = coordinator.resolve(&matter, uri, fill(16, 16)).await.unwrap();
        let second = coordinator.resolve(&matter, uri, fill(16, 16)).await.unwrap();

        assert_eq!(first, second);
        assert!(first.transformed);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(caches.len(), 1);

        let bytes = storage.get(&first.path).await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
    }

    #[tokio::test]
    async fn test_different_query_is_different_artifact() {
        let (_dir, coordinator, counting, caches, _storage, matter) = setup(png(64, 32)).await;

        let a = coordinator
            .resolve(&matter, "/d/photo.png?ir=fill_16_16", fill(16, 16))
            .await
            .unwrap();
        let b = coordinator
            .resolve(&matter, "/d/photo.png?ir=fill_8_8", fill(8, 8))
            .await
            .unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
        assert_eq!(caches.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_leave_one_intact_artifact() {
        let (_dir, coordinator, _counting, caches, storage, matter) = setup(png(128, 128)).await;
        let uri = "/d/photo.png?ir=fixed_40_20";
        let params = Some(ResizeParams::new(ResizeMode::Fixed, Some(40), Some(20)).unwrap());

        let mut handles = Vec::new();
        for _ in 0..6 {
            let coordinator = coordinator.clone();
            let matter = matter.clone();
            handles.push(tokio::spawn(async move {
                coordinator.resolve(&matter, uri, params).await
            }));
        }

        let mut paths = Vec::new();
        for handle in handles {
            paths.push(handle.await.unwrap().unwrap().path);
        }
        paths.dedup();
        assert_eq!(paths.len(), 1);
        assert_eq!(caches.len(), 1);

        let img = image::load_from_memory(&storage.get(&paths[0]).await.unwrap()).unwrap();
        assert_eq!((img.width(), img.height()), (40, 20));
    }

    #[tokio::test]
    async fn test_non_image_fails_without_record() {
        let (_dir, coordinator, _counting, caches, _storage, matter) =
            setup(b"plain text, not an image".to_vec()).await;

        let result = coordinator.resolve(&matter, "/d/photo.png?ir=fit_10_0", Some(
            ResizeParams::new(ResizeMode::Fit, Some(10), None).unwrap(),
        )).await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert!(caches.is_empty());
    }
}
