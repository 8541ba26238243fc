//! Admin gate middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{session_id_from_headers, AccessState, SessionId};
use crate::error::ApiError;
use crate::AppContext;

/// Admit only sessions the access policy reports as authorized
///
/// No session is 401, a signed-in but unauthorized user is 403. The
/// authorized `Principal` and its `SessionId` are attached to the request
/// extensions.
pub async fn require_admin(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(session_id) = session_id_from_headers(request.headers()) else {
        return Err(ApiError::Unauthenticated);
    };

    match ctx.policy.access_state(&ctx.sessions, &session_id).await {
        AccessState::Authorized(principal) => {
            request.extensions_mut().insert(principal);
            request.extensions_mut().insert(SessionId(session_id));
            Ok(next.run(request).await)
        }
        AccessState::Unauthorized { email } => {
            debug!(email = ?email, "Admin request from unauthorized user");
            Err(ApiError::Forbidden)
        }
        AccessState::Unauthenticated => Err(ApiError::Unauthenticated),
    }
}
