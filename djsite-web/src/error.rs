//! HTTP error type for djsite-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use djsite_common::api::ErrorBody;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No signed-in session (401)
    #[error("Sign-in required")]
    Unauthenticated,

    /// Signed in but not permitted (403)
    #[error("Not authorized for the admin page")]
    Forbidden,

    /// Sign-in rejected
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// djsite-common error
    #[error(transparent)]
    Common(#[from] djsite_common::Error),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use djsite_common::Error as CommonError;

        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
            ApiError::Auth(AuthError::InvalidPassword) => {
                (StatusCode::UNAUTHORIZED, "INVALID_PASSWORD")
            }
            ApiError::Auth(AuthError::Disabled) => (StatusCode::FORBIDDEN, "SIGN_IN_DISABLED"),
            ApiError::Auth(AuthError::MissingCredentials(_)) => {
                (StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS")
            }
            ApiError::Auth(AuthError::Identity(_)) => (StatusCode::UNAUTHORIZED, "IDENTITY_ERROR"),
            ApiError::Common(CommonError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Common(CommonError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Common(CommonError::Transfer(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TRANSFER_ERROR")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
            other => other.to_string(),
        };

        (status, Json(ErrorBody::new(error_code, message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
