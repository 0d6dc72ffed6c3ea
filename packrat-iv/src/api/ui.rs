//! UI serving routes
//!
//! Serves the embedded management page. The page is a thin client over
//! the JSON API; the per-item view is shareable via its URL fragment and
//! renders that URL as a scannable code client-side.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../ui/index.html");

/// GET /
///
/// Serves the management UI page
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
