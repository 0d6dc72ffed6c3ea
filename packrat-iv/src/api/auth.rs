//! Authentication middleware
//!
//! Every `/api/*` operation requires an authenticated caller; the check
//! runs before any handler logic. Identity is a bearer token whose
//! SHA-256 digest must match the stored `api_token_hash` setting. The
//! stored value `0` disables checking (development/test convention).
//!
//! Health, the UI page and thumbnail fetches stay open.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use packrat_common::api::auth::{bearer_token, verify_token, AUTH_DISABLED};
use packrat_common::Error;
use tracing::warn;

use super::ApiError;
use crate::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.token_hash == AUTH_DISABLED {
        return Ok(next.run(request).await);
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError(Error::Unauthenticated))?;

    let token = bearer_token(header).map_err(ApiError)?;

    if !verify_token(token, &state.token_hash) {
        warn!("Rejected request with invalid API token");
        return Err(ApiError(Error::Unauthenticated));
    }

    Ok(next.run(request).await)
}
