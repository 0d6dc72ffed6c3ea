//! Item endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use packrat_common::db::models::ItemDetail;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResult, CreatedResponse};
use crate::db::items::{ItemUpdate, NewItem};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: String,
    pub category_id: Uuid,
    pub thumbnail_id: Option<Uuid>,
    pub price: f64,
    pub purchased_date: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub thumbnail_id: Option<Uuid>,
    pub price: Option<f64>,
    pub purchased_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Restrict to one category
    pub category_id: Option<Uuid>,
    /// Substring filter on name or description
    pub q: Option<String>,
}

/// POST /api/items
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let fields = NewItem {
        name: req.name,
        description: req.description,
        category_id: req.category_id,
        thumbnail_id: req.thumbnail_id,
        price: req.price,
        purchased_date: req.purchased_date,
    };
    let guid = db::items::create_item(&state.db, &fields).await?;
    Ok(Json(CreatedResponse { guid }))
}

/// GET /api/items?category_id=&q=
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> ApiResult<Json<Vec<ItemDetail>>> {
    let items = db::items::list_items(&state.db, query.category_id, query.q.as_deref()).await?;
    Ok(Json(items))
}

/// GET /api/items/:id
///
/// A missing id is not an error: the body is JSON null.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Option<ItemDetail>>> {
    let item = db::items::get_item(&state.db, id).await?;
    Ok(Json(item))
}

/// PUT /api/items/:id
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<StatusCode> {
    let update = ItemUpdate {
        name: req.name,
        description: req.description,
        category_id: req.category_id,
        thumbnail_id: req.thumbnail_id,
        price: req.price,
        purchased_date: req.purchased_date,
    };
    db::items::update_item(&state.db, id, &update).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/items/:id
///
/// Blocked with 409 while any kit references the item; the error names
/// every offending kit.
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    db::items::remove_item(&state.db, &state.thumbs, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
