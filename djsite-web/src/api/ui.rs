//! Embedded UI pages

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const ADMIN_HTML: &str = include_str!("../../ui/admin.html");
const ADMIN_JS: &str = include_str!("../../ui/admin.js");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /admin
pub async fn serve_admin() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

/// GET /static/admin.js
pub async fn serve_admin_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        ADMIN_JS,
    )
        .into_response()
}
