//! Admin set mutations: upload, edit, delete

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use djsite_common::SetRecord;
use tracing::{debug, warn};

use crate::auth::SessionId;
use crate::error::{ApiError, ApiResult};
use crate::services::{FileUpload, SetForm};
use crate::AppContext;

fn bad_form(e: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Malformed form data: {}", e))
}

/// Read the admin form: `title`, `description`, `audio` and `image` fields
///
/// A file field without content (nothing selected) counts as absent.
async fn read_set_form(mut multipart: Multipart) -> ApiResult<SetForm> {
    let mut form = SetForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = field.text().await.map_err(bad_form)?,
            "description" => form.description = field.text().await.map_err(bad_form)?,
            "audio" | "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad_form)?;
                if data.is_empty() {
                    continue;
                }
                let upload = FileUpload {
                    file_name,
                    content_type,
                    data,
                };
                if name == "audio" {
                    form.audio = Some(upload);
                } else {
                    form.image = Some(upload);
                }
            }
            other => debug!("Ignoring form field {}", other),
        }
    }

    Ok(form)
}

async fn read_form_or_notify(ctx: &AppContext, multipart: Multipart) -> ApiResult<SetForm> {
    read_set_form(multipart).await.inspect_err(|e| {
        ctx.event_bus.notify_error(e.to_string());
    })
}

/// Bring the caller's working board back in line with the store after a mutation
async fn refresh_board(ctx: &AppContext, session_id: &str) {
    if let Err(e) = ctx.reload_board(session_id).await {
        warn!("Could not reload working board: {}", e);
    }
}

/// POST /api/admin/sets
pub async fn create_set(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SetRecord>)> {
    let form = read_form_or_notify(&ctx, multipart).await?;
    let loaded_count = ctx.loaded_count(&session_id).await?;

    let record = ctx.pipeline().upload(form, loaded_count).await?;
    refresh_board(&ctx, &session_id).await;

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/admin/sets/:id
pub async fn update_set(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<SetRecord>> {
    let form = read_form_or_notify(&ctx, multipart).await?;

    let record = ctx.pipeline().edit(&id, form).await?;
    refresh_board(&ctx, &session_id).await;

    Ok(Json(record))
}

/// DELETE /api/admin/sets/:id
pub async fn delete_set(
    State(ctx): State<AppContext>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    ctx.pipeline().delete(&id).await?;
    refresh_board(&ctx, &session_id).await;
    Ok(StatusCode::NO_CONTENT)
}
