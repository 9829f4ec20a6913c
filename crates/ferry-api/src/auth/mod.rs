//! Session authentication
//!
//! Owners of the delegated API authenticate per request with email and
//! password; downloads additionally accept a regular login session carried as
//! a Bearer JWT.

pub mod session;

pub use session::{issue_session_token, JwtClaims, SessionUser};
