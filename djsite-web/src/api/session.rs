//! Sign-in, sign-out and session status

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use djsite_common::api::{generate_session_token, LoginRequest, SessionResponse};
use djsite_common::config::AccessPolicyKind;
use tracing::{info, warn};

use crate::auth::{
    expired_session_cookie, session_cookie, session_id_from_headers, AccessState, Credentials,
};
use crate::error::{ApiError, ApiResult};
use crate::AppContext;

fn session_response(ctx: &AppContext, state: &AccessState) -> SessionResponse {
    let (email, display_name) = match state {
        AccessState::Authorized(principal) => {
            (principal.email.clone(), principal.display_name.clone())
        }
        AccessState::Unauthorized { email } => (email.clone(), None),
        AccessState::Unauthenticated => (None, None),
    };
    let kind = ctx.policy.kind();
    let google_client_id = match kind {
        AccessPolicyKind::AllowList => ctx.settings.google_client_id.clone(),
        AccessPolicyKind::SharedSecret => None,
    };
    SessionResponse {
        status: state.status(),
        policy: kind.as_str().to_string(),
        email,
        display_name,
        google_client_id,
    }
}

/// GET /api/session
pub async fn session_status(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let state = match session_id_from_headers(&headers) {
        Some(session_id) => ctx.policy.access_state(&ctx.sessions, &session_id).await,
        None => AccessState::Unauthenticated,
    };
    Json(session_response(&ctx, &state))
}

/// POST /api/session/login
///
/// A successful sign-in always starts a fresh session id; the previous
/// session and its working board, if any, are dropped. Failures are reported
/// to the caller only.
pub async fn login(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    let result = match Credentials::from_login(ctx.policy.kind(), request) {
        Ok(credentials) => {
            let session_id = generate_session_token();
            ctx.policy
                .sign_in(&ctx.sessions, &session_id, credentials)
                .await
                .map(|state| (session_id, state))
        }
        Err(e) => Err(e),
    };

    let (session_id, state) = match result {
        Ok(signed_in) => signed_in,
        Err(e) => {
            warn!("Sign-in rejected: {}", e);
            return Err(ApiError::Auth(e));
        }
    };

    if let Some(previous) = session_id_from_headers(&headers) {
        ctx.clear(&previous).await;
    }
    if state.is_authorized() {
        info!(policy = ctx.policy.kind().as_str(), "Admin session started");
    }

    Ok((
        [(header::SET_COOKIE, session_cookie(&session_id))],
        Json(session_response(&ctx, &state)),
    )
        .into_response())
}

/// POST /api/session/logout
pub async fn logout(State(ctx): State<AppContext>, headers: HeaderMap) -> Response {
    if let Some(session_id) = session_id_from_headers(&headers) {
        ctx.clear(&session_id).await;
    }
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Json(session_response(&ctx, &AccessState::Unauthenticated)),
    )
        .into_response()
}
