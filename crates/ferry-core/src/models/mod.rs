//! Data models
//!
//! Persistent entities (users, matters, capability tokens, cached image
//! artifacts) together with the request/response DTOs of the delegated API.

mod capability;
mod download_token;
mod image_cache;
mod matter;
mod upload_token;
mod user;

pub use capability::*;
pub use download_token::*;
pub use image_cache::*;
pub use matter::*;
pub use upload_token::*;
pub use user::*;
