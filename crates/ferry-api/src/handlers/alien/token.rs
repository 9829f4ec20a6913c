use crate::error::{ErrorResponse, HttpAppError, ValidatedForm};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::utils::ip_extraction::ClientIp;
use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use ferry_core::models::{IssueDownloadTokenForm, IssueUploadTokenForm};
use ferry_core::validation::{parse_expire, parse_privacy, parse_size, parse_uuid};
use ferry_services::UploadGrantRequest;
use std::sync::Arc;

/// Issue an upload token for one named file
#[utoipa::path(
    post,
    path = "/api/alien/fetch/upload/token",
    tag = "alien",
    request_body(content = IssueUploadTokenForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Upload token issued"),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 404, description = "Target folder does not exist", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(filename = %form.filename))]
pub async fn fetch_upload_token(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidatedForm(form): ValidatedForm<IssueUploadTokenForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let expire_secs = parse_expire(form.expire.as_deref())?;
    let privacy = parse_privacy(&form.privacy)?;
    let size = parse_size(&form.size)?;

    let user = state.credentials.authenticate(&form.email, &form.password).await?;
    let folder = state.uploads.ingestor().resolve_dir(user.id, &form.dir).await?;

    let token = state
        .upload_issuer
        .issue(
            &user,
            UploadGrantRequest {
                folder,
                filename: form.filename,
                size,
                privacy,
                expire_secs,
                ip,
            },
            Utc::now(),
        )
        .await?;

    Ok(ApiResponse::ok(token))
}

/// Issue a download token for a file the caller owns
#[utoipa::path(
    post,
    path = "/api/alien/fetch/download/token",
    tag = "alien",
    request_body(content = IssueDownloadTokenForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Download token issued"),
        (status = 400, description = "Invalid parameters or a directory", body = ErrorResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 403, description = "File belongs to someone else", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn fetch_download_token(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidatedForm(form): ValidatedForm<IssueDownloadTokenForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let matter_id = parse_uuid("matterUuid", &form.matter_uuid)?;
    let expire_secs = parse_expire(form.expire.as_deref())?;

    let user = state.credentials.authenticate(&form.email, &form.password).await?;

    let token = state
        .download_issuer
        .issue(&user, matter_id, expire_secs, ip, Utc::now())
        .await?;

    Ok(ApiResponse::ok(token))
}
