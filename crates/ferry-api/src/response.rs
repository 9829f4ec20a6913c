//! Success envelope shared by every JSON endpoint

use axum::Json;
use serde::Serialize;

/// `{"code":"OK","data":…}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self { code: "OK", data })
    }
}
