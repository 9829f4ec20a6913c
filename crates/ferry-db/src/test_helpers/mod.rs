//! Test utilities for crates built on the store traits

pub mod mock_stores;

pub use mock_stores::{
    MockDownloadTokenStore, MockImageCacheStore, MockMatterStore, MockUploadTokenStore,
    MockUserStore,
};
