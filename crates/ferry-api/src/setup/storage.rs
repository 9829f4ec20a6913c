//! Storage setup and initialization

use anyhow::{Context, Result};
use ferry_core::Config;
use ferry_storage::{LocalStorage, Storage};
use std::sync::Arc;

/// Local storage rooted at the configured storage root
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.storage_root())
        .await
        .context("Failed to initialize local storage")?;

    tracing::info!(
        root = %storage.base_path().display(),
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}
