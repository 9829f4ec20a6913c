//! Database repositories
//!
//! One repository per table. All queries are runtime-checked (`sqlx::query*`)
//! so the workspace builds without a live database.

pub mod download_token;
pub mod image_cache;
pub mod matter;
pub mod upload_token;
pub mod user;

pub use download_token::DownloadTokenRepository;
pub use image_cache::ImageCacheRepository;
pub use matter::MatterRepository;
pub use upload_token::UploadTokenRepository;
pub use user::UserRepository;
