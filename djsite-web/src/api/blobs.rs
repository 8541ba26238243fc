//! Direct blob retrieval

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiResult;
use crate::AppContext;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Audio or raster image types; anything else is served as opaque bytes
fn is_servable(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    let token_ok = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));
    token_ok && (kind == "audio" || (kind == "image" && !subtype.starts_with("svg")))
}

/// Response content type: stored metadata, else sniffed from the bytes
fn served_content_type(declared: Option<&str>, data: &[u8]) -> String {
    declared
        .map(str::to_string)
        .or_else(|| infer::get(data).map(|kind| kind.mime_type().to_string()))
        .filter(|content_type| is_servable(content_type))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// GET /blobs/*key
pub async fn fetch_blob(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    let object = ctx.blobs.fetch(&key).await?;
    let content_type = served_content_type(object.metadata.content_type.as_deref(), &object.data);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        object.data,
    )
        .into_response())
}
