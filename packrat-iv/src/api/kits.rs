//! Kit endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use packrat_common::db::models::KitDetail;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResult, CreatedResponse};
use crate::db::kits::{KitUpdate, NewKit};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateKitRequest {
    pub name: String,
    pub description: String,
    pub item_ids: Vec<Uuid>,
    pub price: f64,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateKitRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub item_ids: Option<Vec<Uuid>>,
    pub price: Option<f64>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListKitsQuery {
    /// Substring filter on name or description
    pub q: Option<String>,
}

/// POST /api/kits
pub async fn create_kit(
    State(state): State<AppState>,
    Json(req): Json<CreateKitRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let fields = NewKit {
        name: req.name,
        description: req.description,
        item_ids: req.item_ids,
        price: req.price,
        color: req.color,
    };
    let guid = db::kits::create_kit(&state.db, &fields).await?;
    Ok(Json(CreatedResponse { guid }))
}

/// GET /api/kits?q=
pub async fn list_kits(
    State(state): State<AppState>,
    Query(query): Query<ListKitsQuery>,
) -> ApiResult<Json<Vec<KitDetail>>> {
    let kits = db::kits::list_kits(&state.db, query.q.as_deref()).await?;
    Ok(Json(kits))
}

/// GET /api/kits/:id
///
/// A missing id is not an error: the body is JSON null.
pub async fn get_kit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Option<KitDetail>>> {
    let kit = db::kits::get_kit(&state.db, id).await?;
    Ok(Json(kit))
}

/// PUT /api/kits/:id
pub async fn update_kit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateKitRequest>,
) -> ApiResult<StatusCode> {
    let update = KitUpdate {
        name: req.name,
        description: req.description,
        item_ids: req.item_ids,
        price: req.price,
        color: req.color,
    };
    db::kits::update_kit(&state.db, id, &update).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/kits/:id
pub async fn remove_kit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    db::kits::remove_kit(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
