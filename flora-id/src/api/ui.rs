//! Landing page
//!
//! Serves the static upload page; results are rendered client-side from the
//! JSON returned by `POST /`.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../ui/index.html");

/// GET /
///
/// Serves the sample upload page
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
