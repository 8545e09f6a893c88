//! Mapping of search failures to HTTP responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shelf_rag::RagError;
use tracing::debug;

/// Detail sent for every failure that is not the caller's fault.
pub const INTERNAL_ERROR_DETAIL: &str =
    "Internal Server Error: Something went wrong with the search engine.";

/// Detail sent when the request body is not a valid search request.
pub const INVALID_BODY_DETAIL: &str =
    "Request body must be a JSON object with a string \"query\" field.";

/// JSON error body: `{ "detail": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

/// An error ready to be sent to an HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: INTERNAL_ERROR_DETAIL.to_string(),
        }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::InvalidQuery(detail) => Self {
                status: StatusCode::BAD_REQUEST,
                detail,
            },
            _ => Self::internal(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected search request body");
        Self {
            status: rejection.status(),
            detail: INVALID_BODY_DETAIL.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.detail;
        (self.status, Json(ErrorBody { detail })).into_response()
    }
}
