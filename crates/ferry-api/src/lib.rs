//! Ferry HTTP API
//!
//! Axum handlers for the delegated ("alien") transfer endpoints, the
//! application state they share and the startup wiring.

mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod response;
pub mod setup;
pub mod state;
mod telemetry;
pub mod utils;

pub use state::{AppState, Stores};
