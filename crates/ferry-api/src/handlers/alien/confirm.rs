use crate::error::{ErrorResponse, HttpAppError, ValidatedForm};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};
use ferry_core::models::ConfirmForm;
use ferry_core::validation::parse_uuid;
use std::sync::Arc;

/// Let the owner check that a delegated upload produced the expected file
#[utoipa::path(
    post,
    path = "/api/alien/confirm",
    tag = "alien",
    request_body(content = ConfirmForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "The stored file"),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 403, description = "File belongs to someone else", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    ValidatedForm(form): ValidatedForm<ConfirmForm>,
) -> Result<impl IntoResponse, HttpAppError> {
    let matter_id = parse_uuid("matterUuid", &form.matter_uuid)?;
    let user = state.credentials.authenticate(&form.email, &form.password).await?;
    let matter = state.uploads.confirm(&user, matter_id).await?;
    Ok(ApiResponse::ok(matter))
}
