//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use ferry_core::models;

/// The OpenAPI document for every route the server mounts
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ferry API",
        version = "0.1.0",
        description = "Delegated file transfer: owners issue single-use upload tokens and time-boxed download tokens; token holders upload, crawl or download without an account. Images can be resized on download and the results are cached."
    ),
    paths(
        handlers::alien::token::fetch_upload_token,
        handlers::alien::token::fetch_download_token,
        handlers::alien::upload::upload,
        handlers::alien::crawl::crawl_token,
        handlers::alien::crawl::crawl_direct,
        handlers::alien::confirm::confirm,
        handlers::alien::download::download,
        handlers::health::health,
    ),
    components(
        schemas(
            models::IssueUploadTokenForm,
            models::IssueDownloadTokenForm,
            models::CrawlTokenForm,
            models::CrawlDirectForm,
            models::ConfirmForm,
            models::UploadToken,
            models::DownloadToken,
            models::Matter,
            models::UserRole,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "alien", description = "Capability tokens and delegated transfers"),
        (name = "health", description = "Liveness"),
    )
)]
struct ApiDoc;
