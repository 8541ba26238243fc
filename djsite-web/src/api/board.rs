//! Working board: drag gestures and order save

use axum::{extract::State, Extension, Json};
use djsite_common::ReorderBoard;
use serde::{Deserialize, Serialize};

use crate::auth::SessionId;
use crate::error::ApiResult;
use crate::services::save_order;
use crate::AppContext;

/// One drag-and-drop gesture from the admin page
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum DragGesture {
    Start { index: usize },
    Over { index: usize },
    Drop { index: usize },
    End,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: usize,
}

/// GET /api/admin/board
pub async fn get_board(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> ApiResult<Json<ReorderBoard>> {
    let board = ctx.board(&session_id).await?;
    let snapshot = board.read().await.clone();
    Ok(Json(snapshot))
}

/// POST /api/admin/board/drag
///
/// Invalid gestures (no drag in progress, index off the board) are ignored;
/// the response is the board either way.
pub async fn drag(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(gesture): Json<DragGesture>,
) -> ApiResult<Json<ReorderBoard>> {
    let board = ctx.board(&session_id).await?;
    let mut board = board.write().await;
    match gesture {
        DragGesture::Start { index } => board.drag_start(index),
        DragGesture::Over { index } => board.drag_over(index),
        DragGesture::Drop { index } => {
            if !board.drop_at(index) {
                tracing::debug!(index, "Drop ignored");
            }
        }
        DragGesture::End => board.drag_end(),
    }
    Ok(Json(board.clone()))
}

/// POST /api/admin/board/move
pub async fn move_item(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<Json<ReorderBoard>> {
    let board = ctx.board(&session_id).await?;
    let mut board = board.write().await;
    board.move_item(request.from, request.to);
    Ok(Json(board.clone()))
}

/// POST /api/admin/board/save
///
/// Persists the caller's own working order; other sessions' boards are
/// untouched.
pub async fn save(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> ApiResult<Json<SaveResponse>> {
    let board = ctx.board(&session_id).await?;
    let saved = save_order(ctx.store.as_ref(), &board, &ctx.event_bus).await?;
    Ok(Json(SaveResponse { saved }))
}
