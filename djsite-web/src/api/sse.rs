//! Admin event stream

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use djsite_common::sse::create_event_bus_sse_stream;
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppContext;

/// GET /api/admin/events
///
/// Upload progress, upload completion, notifications and catalog changes.
pub async fn admin_event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    create_event_bus_sse_stream(&ctx.event_bus, "admin")
}
