//! Ferry Processing Library
//!
//! CPU-bound transformations of stored files. Today this is image resizing
//! for the download cache; callers run it on a blocking thread.

pub mod image;

pub use image::{ImageResize, ImageTransformer, ResizedImage};
