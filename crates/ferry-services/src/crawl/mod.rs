//! Fetching crawl sources from remote URLs

mod fetcher;
mod ssrf;

pub use fetcher::{HttpFetcher, RemoteFetcher};
pub use ssrf::validate_url_for_ssrf;
