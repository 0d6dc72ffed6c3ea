//! packrat-iv library - Inventory service module
//!
//! Three entity stores (categories, items, kits) over SQLite, with
//! cross-entity consistency rules enforced at mutation time and
//! denormalized joins computed fresh at read time.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod thumbs;

use thumbs::ThumbnailStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// SHA-256 digest of the API token ("0" disables auth)
    pub token_hash: String,
    /// Thumbnail blob store
    pub thumbs: ThumbnailStore,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, token_hash: String, thumbs: ThumbnailStore) -> Self {
        Self {
            db,
            token_hash,
            thumbs,
        }
    }
}

/// Build application router
///
/// Every `/api/*` route requires authentication; health, the UI page and
/// thumbnail fetches are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::cors::CorsLayer;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route(
            "/api/categories",
            post(api::categories::create_category).get(api::categories::list_categories),
        )
        .route("/api/categories/:id", get(api::categories::get_category))
        .route(
            "/api/items",
            post(api::items::create_item).get(api::items::list_items),
        )
        .route(
            "/api/items/:id",
            get(api::items::get_item)
                .put(api::items::update_item)
                .delete(api::items::remove_item),
        )
        .route(
            "/api/kits",
            post(api::kits::create_kit).get(api::kits::list_kits),
        )
        .route(
            "/api/kits/:id",
            get(api::kits::get_kit)
                .put(api::kits::update_kit)
                .delete(api::kits::remove_kit),
        )
        .route("/api/thumbnails", post(api::thumbnails::upload_thumbnail))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::ui::serve_index))
        .route("/thumbnails/:id", get(api::thumbnails::fetch_thumbnail))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
