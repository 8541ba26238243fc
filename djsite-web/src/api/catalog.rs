//! Catalog listings: public and admin

use axum::{extract::State, Extension, Json};
use djsite_common::SetRecord;

use crate::auth::SessionId;
use crate::error::ApiResult;
use crate::services::{load_public_catalog, CatalogEntry};
use crate::AppContext;

/// GET /api/sets
///
/// Ordered catalog with resolved audio URLs.
pub async fn public_sets(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<CatalogEntry>>> {
    let entries = load_public_catalog(ctx.store.as_ref(), ctx.blobs.as_ref()).await?;
    Ok(Json(entries))
}

/// GET /api/admin/sets
///
/// Reloads the caller's working board from the store and returns it.
pub async fn admin_sets(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> ApiResult<Json<Vec<SetRecord>>> {
    ctx.reload_board(&session_id).await?;
    let board = ctx.board(&session_id).await?;
    let items = board.read().await.items().to_vec();
    Ok(Json(items))
}
