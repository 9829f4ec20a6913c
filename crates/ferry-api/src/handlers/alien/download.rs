use crate::auth::SessionUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::content_type::content_type_for;
use axum::{
    body::Body,
    extract::{OriginalUri, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use chrono::Utc;
use ferry_core::validation::parse_uuid;
use ferry_core::{AppError, ResizeParams};
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::sync::Arc;

/// Download a file, optionally resized
///
/// Public files need nothing. Private files need either a download token
/// (`downloadTokenUuid`) issued by the current owner, or a session of the
/// owner or an administrator. Images accept `ir=<mode>_<w>_<h>` or
/// `imageProcess=resize&imageResizeM=…&imageResizeW=…&imageResizeH=…`.
#[utoipa::path(
    get,
    path = "/api/alien/download/{matter_uuid}/{filename}",
    tag = "alien",
    params(
        ("matter_uuid" = String, Path, description = "File id"),
        ("filename" = String, Path, description = "Stored name of the file"),
        ("downloadTokenUuid" = Option<String>, Query, description = "Download token for private files"),
        ("ir" = Option<String>, Query, description = "Compact resize, e.g. fill_200_100")
    ),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 401, description = "Login or a download token is required", body = ErrorResponse),
        (status = 403, description = "Token not valid for this file", body = ErrorResponse),
        (status = 404, description = "File or token not found", body = ErrorResponse),
        (status = 409, description = "Filename does not match", body = ErrorResponse),
        (status = 410, description = "Download token expired", body = ErrorResponse),
        (status = 502, description = "File could not be processed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(matter_id = %matter_uuid))]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((matter_uuid, filename)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
    SessionUser(session): SessionUser,
) -> Result<Response, HttpAppError> {
    let matter_id = parse_uuid("matterUuid", &matter_uuid)?;
    let params = ResizeParams::from_query(&query)?;
    let now = Utc::now();

    let authorized = state
        .authorizer
        .authorize_download(
            matter_id,
            &filename,
            query.get("downloadTokenUuid").map(String::as_str),
            session,
            now,
        )
        .await?;
    let matter = &authorized.matter;

    let request_uri = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let resolved = state.image_cache.resolve(matter, &request_uri, params).await?;

    let content_type = if resolved.transformed {
        content_type_for(&resolved.path)
    } else {
        content_type_for(&matter.name)
    };
    let content_length = state.storage.content_length(&resolved.path).await.map_err(AppError::from)?;

    let stream = state
        .storage
        .download_stream(&resolved.path)
        .await
        .map_err(AppError::from)?;

    // Only a download that is about to be served uses up the token
    state.authorizer.complete(&authorized, now).await?;

    tracing::debug!(path = %resolved.path, transformed = resolved.transformed, "Streaming file");

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let disposition = format!(
        "inline; filename*=UTF-8''{}",
        utf8_percent_encode(&matter.name, NON_ALPHANUMERIC)
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CACHE_CONTROL, if matter.privacy { "private, no-store" } else { "public, max-age=3600" })
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
