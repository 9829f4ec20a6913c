//! Delegated ("alien") transfer endpoints
//!
//! Owner-side endpoints authenticate with `email` and `password` form fields
//! and hand out capability tokens; the delegated side presents those tokens
//! to upload, crawl or download without any account of its own.

pub mod confirm;
pub mod crawl;
pub mod download;
pub mod token;
pub mod upload;
