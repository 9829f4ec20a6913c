//! Ferry Storage Library
//!
//! Byte storage for uploaded matters and cached image artifacts.
//!
//! # Storage key format
//!
//! - **Matters**: `matter/{user_id}/{matter_id}[.{ext}]`
//! - **Image artifacts**: `cache/{matter_id}/{sha256(request_uri)}.{ext}`
//!
//! Keys are always relative to the storage root and must not contain `..` or a
//! leading `/`. Key generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::{artifact_key, matter_key};
pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
