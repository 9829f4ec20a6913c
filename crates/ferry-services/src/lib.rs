//! Ferry Services Layer
//!
//! The business rules of delegated transfers: issuing and consuming
//! capability tokens, deciding who may download a file, and the lazy
//! cache-or-compute protocol for resized images. HTTP handling stays in
//! ferry-api; persistence and byte storage are reached through the store and
//! storage traits only.

pub mod authorization;
pub mod capability;
pub mod crawl;
pub mod credentials;
pub mod image_cache;
pub mod ingest;
pub mod issuer;
pub mod upload;

pub use authorization::{
    authorize, AuthorizedDownload, Decision, DenyReason, DownloadAuthorizer, DownloadGrant,
};
pub use capability::{CapabilityValidator, Rejection};
pub use crawl::{HttpFetcher, RemoteFetcher};
pub use credentials::CredentialVerifier;
pub use image_cache::{
    Artifact, ArtifactMaterializer, ImageCacheCoordinator, ImageResizeMaterializer,
    ResolvedArtifact,
};
pub use ingest::MatterIngestor;
pub use issuer::{DownloadTokenIssuer, UploadGrantRequest, UploadTokenIssuer};
pub use upload::UploadService;
