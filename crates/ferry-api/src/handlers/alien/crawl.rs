use crate::error::{ErrorResponse, HttpAppError, ValidatedForm};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use ferry_core::models::{CrawlDirectForm, CrawlTokenForm};
use ferry_core::validation::parse_privacy;
use std::sync::Arc;

/// Fetch a remote URL into the file an upload token was issued for
#[utoipa::path(
    post,
    path = "/api/alien/crawl/token",
    tag = "alien",
    request_body(content = CrawlTokenForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "File stored"),
        (status = 400, description = "Invalid URL", body = ErrorResponse),
        (status = 410, description = "Upload token expired or already used", body = ErrorResponse),
        (status = 502, description = "Remote fetch failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(url = %form.url))]
pub async fn crawl_token(
    State(state): State<Arc<AppState>>,
    ValidatedForm(form): ValidatedForm<CrawlTokenForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let matter = state
        .uploads
        .consume_crawl(&form.upload_token_uuid, &form.url, Utc::now())
        .await?;

    Ok(ApiResponse::ok(matter))
}

/// Fetch a remote URL on the owner's own credentials
#[utoipa::path(
    post,
    path = "/api/alien/crawl/direct",
    tag = "alien",
    request_body(content = CrawlDirectForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "File stored"),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 502, description = "Remote fetch failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(filename = %form.filename, url = %form.url))]
pub async fn crawl_direct(
    State(state): State<Arc<AppState>>,
    ValidatedForm(form): ValidatedForm<CrawlDirectForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let privacy = parse_privacy(&form.privacy)?;
    let user = state.credentials.authenticate(&form.email, &form.password).await?;

    let matter = state
        .uploads
        .crawl_direct(&user, &form.filename, &form.url, privacy, &form.dir)
        .await?;

    Ok(ApiResponse::ok(matter))
}
