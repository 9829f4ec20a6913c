use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use bytes::Bytes;
use chrono::Utc;
use ferry_core::AppError;
use std::sync::Arc;

/// Fields of the delegated multipart upload
struct UploadParts {
    token: String,
    filename: String,
    data: Bytes,
}

/// Read `uploadTokenUuid` and exactly one `file` part, in any order
async fn read_parts(mut multipart: Multipart) -> Result<UploadParts, AppError> {
    let mut token = String::new();
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        match field.name() {
            Some("uploadTokenUuid") => {
                token = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read uploadTokenUuid: {}", e))
                })?;
            }
            Some("file") => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok(UploadParts {
        token,
        filename,
        data,
    })
}

/// Upload the file an upload token was issued for
#[utoipa::path(
    post,
    path = "/api/alien/upload",
    tag = "alien",
    request_body(content_type = "multipart/form-data", description = "`uploadTokenUuid` and one `file` part"),
    responses(
        (status = 200, description = "File stored"),
        (status = 404, description = "Unknown upload token", body = ErrorResponse),
        (status = 409, description = "File does not match the token", body = ErrorResponse),
        (status = 410, description = "Upload token expired or already used", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let parts = read_parts(multipart).await?;

    let matter = state
        .uploads
        .consume_upload(&parts.token, &parts.filename, parts.data, Utc::now())
        .await?;

    Ok(ApiResponse::ok(matter))
}
