//! Category endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use packrat_common::db::models::Category;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiResult, CreatedResponse};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// Substring filter on the category name
    pub q: Option<String>,
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let guid = db::categories::create_category(&state.db, &req.name).await?;
    Ok(Json(CreatedResponse { guid }))
}

/// GET /api/categories?q=
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = db::categories::list_categories(&state.db, query.q.as_deref()).await?;
    Ok(Json(categories))
}

/// GET /api/categories/:id
///
/// A missing id is not an error: the body is JSON null.
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Option<Category>>> {
    let category = db::categories::get_category(&state.db, id).await?;
    Ok(Json(category))
}
