//! djsite-web library - DJ set catalog service
//!
//! Public set catalog plus the access-gated admin surface for uploading,
//! editing, reordering and deleting sets.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod auth;
pub mod context;
pub mod db;
pub mod error;
pub mod services;
pub mod storage;

pub use context::AppContext;
pub use error::{ApiError, ApiResult};

/// Build application router
///
/// Admin routes sit behind `require_admin`; pages, the public catalog, blob
/// retrieval, session endpoints and /health are open.
pub fn build_router(ctx: AppContext) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    let max_upload_bytes = ctx.settings.max_upload_bytes;

    // Protected routes (require an authorized session)
    let protected = Router::new()
        .route(
            "/api/admin/sets",
            get(api::admin_sets).post(api::create_set),
        )
        .route(
            "/api/admin/sets/:id",
            put(api::update_set).delete(api::delete_set),
        )
        .route("/api/admin/board", get(api::board::get_board))
        .route("/api/admin/board/drag", post(api::board::drag))
        .route("/api/admin/board/move", post(api::board::move_item))
        .route("/api/admin/board/save", post(api::board::save))
        .route("/api/admin/events", get(api::admin_event_stream))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn_with_state(ctx.clone(), api::require_admin));

    // Public routes
    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/admin", get(api::serve_admin))
        .route("/static/admin.js", get(api::serve_admin_js))
        .route("/api/sets", get(api::public_sets))
        .route("/blobs/*key", get(api::fetch_blob))
        .route("/api/session", get(api::session_status))
        .route("/api/session/login", post(api::login))
        .route("/api/session/logout", post(api::logout))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
