//! Integration tests for packrat-iv API endpoints
//!
//! Tests cover:
//! - Category create/list/get and duplicate-name rejection
//! - Item CRUD with enrichment, filtering and the deletion guard
//! - Kit CRUD with reference validation and color normalization
//! - Thumbnail upload/fetch and cleanup on item deletion
//! - Authentication middleware and public routes
//! - Health endpoint (no auth required)

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use packrat_common::api::auth::hash_token;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

use packrat_iv::thumbs::ThumbnailStore;
use packrat_iv::{build_router, AppState};

// Minimal PNG header, enough for content sniffing
const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
];

/// Test helper: in-memory database with schema applied
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Should create in-memory database");
    packrat_common::db::init::create_tables(&pool)
        .await
        .expect("Should create tables");
    pool
}

/// Test helper: app with auth disabled (token hash "0")
async fn setup_app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let thumbs = ThumbnailStore::new(dir.path().join("thumbnails")).unwrap();
    let state = AppState::new(setup_test_db().await, "0".to_string(), thumbs);
    (dir, build_router(state))
}

/// Test helper: GET/DELETE request without body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: request with a JSON body
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn create_category(app: &axum::Router, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/categories", json!({ "name": name })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_item(app: &axum::Router, name: &str, category_id: &str, price: f64) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/items",
            json!({
                "name": name,
                "description": format!("{} description", name),
                "category_id": category_id,
                "price": price,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_kit(app: &axum::Router, name: &str, item_ids: &[&str], price: f64) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/kits",
            json!({
                "name": name,
                "description": "",
                "item_ids": item_ids,
                "price": price,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string()
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (_dir, app) = setup_app().await;

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "packrat-iv");
    assert!(body["version"].is_string());
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_api_requires_token_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let thumbs = ThumbnailStore::new(dir.path().join("thumbnails")).unwrap();
    let state = AppState::new(setup_test_db().await, hash_token("test-token"), thumbs);
    let app = build_router(state);

    // No token
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/items"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong token
    let request = Request::builder()
        .method("GET")
        .uri("/api/items")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct token
    let request = Request::builder()
        .method("GET")
        .uri("/api/items")
        .header("authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Public routes stay open
    for uri in ["/health", "/"] {
        let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} should be public", uri);
    }
}

// =============================================================================
// Category Tests
// =============================================================================

#[tokio::test]
async fn test_category_create_twice_yields_one_conflict() {
    let (_dir, app) = setup_app().await;

    create_category(&app, "Electronics").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/categories",
            json!({ "name": "Electronics" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let response = app
        .oneshot(test_request("GET", "/api/categories"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_get_missing_returns_null() {
    let (_dir, app) = setup_app().await;

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/categories/00000000-0000-0000-0000-000000000001",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(extract_json(response.into_body()).await.is_null());
}

// =============================================================================
// Item Tests
// =============================================================================

#[tokio::test]
async fn test_item_round_trip_with_enrichment() {
    let (_dir, app) = setup_app().await;

    let category_id = create_category(&app, "Electronics").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/items",
            json!({
                "name": "Cable",
                "description": "USB-C cable",
                "category_id": category_id,
                "price": 5.0,
                "purchased_date": 1700000000000_i64,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let item_id = extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(test_request("GET", &format!("/api/items/{}", item_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    // Supplied fields unchanged
    assert_eq!(body["name"], "Cable");
    assert_eq!(body["description"], "USB-C cable");
    assert_eq!(body["category_id"], Value::String(category_id));
    assert_eq!(body["price"], 5.0);
    assert_eq!(body["purchased_date"], 1700000000000_i64);
    // Derived fields computed fresh
    assert_eq!(body["category_name"], "Electronics");
    assert!(body["thumbnail_url"].is_null());
    assert!(body["associated_kits"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_item_with_unresolvable_category_reads_uncategorized() {
    let (_dir, app) = setup_app().await;

    // The category reference is never checked at item create time
    let item_id = create_item(&app, "Orphan", "00000000-0000-0000-0000-00000000dead", 1.0).await;

    let response = app
        .oneshot(test_request("GET", &format!("/api/items/{}", item_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["category_name"], "Uncategorized");
}

#[tokio::test]
async fn test_item_list_filters() {
    let (_dir, app) = setup_app().await;

    let electronics = create_category(&app, "Electronics").await;
    let camping = create_category(&app, "Camping").await;
    create_item(&app, "Cable", &electronics, 5.0).await;
    create_item(&app, "Tent", &camping, 120.0).await;

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            &format!("/api/items?category_id={}", camping),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Tent");

    let response = app
        .oneshot(test_request("GET", "/api/items?q=cable"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Cable");
}

#[tokio::test]
async fn test_item_negative_price_rejected() {
    let (_dir, app) = setup_app().await;
    let category_id = create_category(&app, "Electronics").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/items",
            json!({
                "name": "Cable",
                "description": "",
                "category_id": category_id,
                "price": -5.0,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Deletion Guard Scenario
// =============================================================================

#[tokio::test]
async fn test_item_remove_blocked_then_allowed() {
    let (_dir, app) = setup_app().await;

    let category_id = create_category(&app, "Electronics").await;
    let cable_id = create_item(&app, "Cable", &category_id, 5.0).await;
    let kit_id = create_kit(&app, "Starter Pack", &[&cable_id], 4.5).await;

    // Blocked, naming the offending kit
    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/items/{}", cable_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Starter Pack"));

    // Delete the kit, then the item delete succeeds
    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/kits/{}", kit_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/items/{}", cable_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(test_request("GET", &format!("/api/items/{}", cable_id)))
        .await
        .unwrap();
    assert!(extract_json(response.into_body()).await.is_null());
}

// =============================================================================
// Kit Tests
// =============================================================================

#[tokio::test]
async fn test_kit_create_with_missing_item_writes_nothing() {
    let (_dir, app) = setup_app().await;

    let category_id = create_category(&app, "Electronics").await;
    let cable_id = create_item(&app, "Cable", &category_id, 5.0).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/kits",
            json!({
                "name": "Broken",
                "description": "",
                "item_ids": [cable_id, "00000000-0000-0000-0000-00000000beef"],
                "price": 1.0,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("00000000-0000-0000-0000-00000000beef"));

    // Pre- and post-state identical
    let response = app.oneshot(test_request("GET", "/api/kits")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_kit_list_enriches_items() {
    let (_dir, app) = setup_app().await;

    let category_id = create_category(&app, "Electronics").await;
    let cable_id = create_item(&app, "Cable", &category_id, 5.0).await;
    create_kit(&app, "Starter Pack", &[&cable_id], 4.5).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/kits"))
        .await
        .unwrap();
    let first = extract_json(response.into_body()).await;
    let kits = first.as_array().unwrap();
    assert_eq!(kits.len(), 1);
    assert_eq!(kits[0]["name"], "Starter Pack");
    assert_eq!(kits[0]["items"][0]["name"], "Cable");
    assert_eq!(kits[0]["items"][0]["category_name"], "Electronics");

    // Joins are recomputed, not cached: two reads agree structurally
    let response = app.oneshot(test_request("GET", "/api/kits")).await.unwrap();
    let second = extract_json(response.into_body()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_kit_empty_color_reads_as_unset() {
    let (_dir, app) = setup_app().await;

    let category_id = create_category(&app, "Electronics").await;
    let cable_id = create_item(&app, "Cable", &category_id, 5.0).await;
    let kit_id = create_kit(&app, "Pack", &[&cable_id], 4.5).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/kits/{}", kit_id),
            json!({ "color": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(test_request("GET", &format!("/api/kits/{}", kit_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["color"].is_null());
}

#[tokio::test]
async fn test_kit_update_validates_new_item_list() {
    let (_dir, app) = setup_app().await;

    let category_id = create_category(&app, "Electronics").await;
    let cable_id = create_item(&app, "Cable", &category_id, 5.0).await;
    let kit_id = create_kit(&app, "Pack", &[&cable_id], 4.5).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/kits/{}", kit_id),
            json!({ "item_ids": ["00000000-0000-0000-0000-00000000beef"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Membership unchanged
    let response = app
        .oneshot(test_request("GET", &format!("/api/kits/{}", kit_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["item_ids"][0], Value::String(cable_id));
}

#[tokio::test]
async fn test_kit_requires_at_least_one_item() {
    let (_dir, app) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/kits",
            json!({ "name": "Empty", "description": "", "item_ids": [], "price": 0.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Thumbnail Tests
// =============================================================================

#[tokio::test]
async fn test_thumbnail_lifecycle_follows_item() {
    let (_dir, app) = setup_app().await;

    // Upload
    let request = Request::builder()
        .method("POST")
        .uri("/api/thumbnails")
        .body(Body::from(PNG_BYTES))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let thumbnail_id = extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string();

    // Attach to an item
    let category_id = create_category(&app, "Electronics").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/items",
            json!({
                "name": "Cable",
                "description": "",
                "category_id": category_id,
                "thumbnail_id": thumbnail_id,
                "price": 5.0,
            }),
        ))
        .await
        .unwrap();
    let item_id = extract_json(response.into_body()).await["guid"]
        .as_str()
        .unwrap()
        .to_string();

    // Resolved URL is fetchable without auth
    let response = app
        .clone()
        .oneshot(test_request("GET", &format!("/api/items/{}", item_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let url = body["thumbnail_url"].as_str().unwrap().to_string();
    assert_eq!(url, format!("/thumbnails/{}", thumbnail_id));

    let response = app.clone().oneshot(test_request("GET", &url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );

    // Deleting the item removes the stored image
    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/items/{}", item_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(test_request("GET", &url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_thumbnail_rejects_non_image() {
    let (_dir, app) = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/thumbnails")
        .body(Body::from("not an image"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
