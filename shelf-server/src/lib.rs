//! `shelf-server` exposes the [`shelf_rag::QueryService`] over HTTP.

pub mod error;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{AppState, ServerConfig, app_router, run_server};
