//! HTTP API handlers for the inventory service

pub mod auth;
pub mod categories;
pub mod health;
pub mod items;
pub mod kits;
pub mod thumbnails;
pub mod ui;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

pub use auth::auth_middleware;
pub use health::health_routes;

/// Response carrying the identifier of a newly created record
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub guid: Uuid,
}

/// Handler result type
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// HTTP wrapper around the common error taxonomy
///
/// Every failure is a terminal, synchronous rejection of the single
/// request, carrying a human-readable message in a JSON `error` field.
#[derive(Debug)]
pub struct ApiError(pub packrat_common::Error);

impl From<packrat_common::Error> for ApiError {
    fn from(err: packrat_common::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use packrat_common::Error;

        let status = match &self.0 {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateName(_) | Error::InUse { .. } => StatusCode::CONFLICT,
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.0);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
