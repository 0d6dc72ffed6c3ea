//! Thumbnail upload and serving
//!
//! Upload is authenticated and happens before the item write that will
//! reference the returned id, so a failed upload leaves no partial state.
//! Fetching is public: thumbnail URLs are embedded in pages and image
//! tags that carry no Authorization header.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::{ApiResult, CreatedResponse};
use crate::AppState;

/// POST /api/thumbnails
///
/// Accepts raw image bytes (PNG, JPEG, GIF or WebP) and returns the new
/// thumbnail reference.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<CreatedResponse>> {
    let guid = state.thumbs.save(&body)?;
    Ok(Json(CreatedResponse { guid }))
}

/// GET /thumbnails/:id
pub async fn fetch_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    match state.thumbs.load(id)? {
        Some((bytes, mime)) => Ok(([("content-type", mime)], bytes).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}
