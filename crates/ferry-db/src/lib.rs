//! Ferry persistence layer
//!
//! Postgres repositories for users, matters, capability tokens and image
//! caches, plus the store traits the service layer is written against.

pub mod db;
pub mod traits;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use db::{
    DownloadTokenRepository, ImageCacheRepository, MatterRepository, UploadTokenRepository,
    UserRepository,
};
pub use traits::{DownloadTokenStore, ImageCacheStore, MatterStore, UploadTokenStore, UserStore};
