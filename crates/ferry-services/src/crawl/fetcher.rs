use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use ferry_core::AppError;
use reqwest::header::{HeaderValue, LOCATION};
use reqwest::{redirect, StatusCode, Url};
use std::time::Duration;

use super::ssrf::validate_url_for_ssrf;

/// Redirect hops followed before a crawl gives up
pub const MAX_CRAWL_REDIRECTS: usize = 5;

/// Source of crawled bytes
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Download the whole body at `url`
    async fn fetch(&self, url: &str) -> Result<Bytes, AppError>;
}

/// reqwest-backed fetcher with an SSRF guard and a body size cap
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
    allow_private_ips: bool,
    allowlist: Option<Vec<String>>,
}

impl HttpFetcher {
    pub fn new(
        timeout: Duration,
        max_bytes: usize,
        allow_private_ips: bool,
        allowlist: Option<Vec<String>>,
    ) -> Result<Self, AppError> {
        // Redirects are followed by hand so every hop passes the SSRF guard
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes,
            allow_private_ips,
            allowlist,
        })
    }

    async fn guard(&self, url: &str) -> Result<(), AppError> {
        validate_url_for_ssrf(url, self.allow_private_ips, self.allowlist.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "SSRF validation failed");
                AppError::InvalidInput(format!("URL validation failed: {}", e))
            })
    }

    fn too_large(&self) -> AppError {
        AppError::PayloadTooLarge(format!(
            "Remote file exceeds the {} byte crawl limit",
            self.max_bytes
        ))
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Bytes, AppError> {
        self.guard(url).await?;
        let mut current = Url::parse(url)
            .map_err(|e| AppError::InvalidInput(format!("Invalid URL format: {}", e)))?;

        let start = std::time::Instant::now();
        let mut hops = 0;

        let mut response = loop {
            let response = self.client.get(current.clone()).send().await.map_err(|e| {
                tracing::warn!(error = %e, url = %current, "Failed to download from URL");
                AppError::Upstream(format!("Failed to download from URL: {}", e))
            })?;

            if !is_followed_redirect(response.status()) {
                break response;
            }
            if hops == MAX_CRAWL_REDIRECTS {
                return Err(AppError::Upstream(format!(
                    "URL redirected more than {} times",
                    MAX_CRAWL_REDIRECTS
                )));
            }
            hops += 1;

            let next = redirect_target(&current, response.headers().get(LOCATION))?;
            tracing::debug!(from = %current, to = %next, hop = hops, "Following crawl redirect");
            self.guard(next.as_str()).await?;
            current = next;
        };

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "URL returned status code: {}",
                response.status()
            )));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes as u64 {
                return Err(self.too_large());
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read response body: {}", e)))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::info!(
            url = %url,
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Crawl source downloaded"
        );

        Ok(body.freeze())
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Resolve a redirect's `Location` against the URL that answered with it
fn redirect_target(base: &Url, location: Option<&HeaderValue>) -> Result<Url, AppError> {
    let location = location
        .ok_or_else(|| AppError::Upstream("Redirect without a Location header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Upstream("Redirect Location is not valid text".to_string()))?;

    base.join(location)
        .map_err(|e| AppError::Upstream(format!("Redirect Location '{}' is invalid: {}", location, e)))
}
