//! Ferry Core Library
//!
//! Domain models, error types, configuration and request validation shared by
//! every Ferry crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod transform;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use transform::{ResizeMode, ResizeParams};
