//! Shared API request/response types

use serde::{Deserialize, Serialize};

// ========================================
// Session Types
// ========================================

/// POST /api/session/login body
///
/// Which field is used depends on the configured access policy: `password`
/// for the shared secret, `id_token` for federated sign-in.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Rendered access state of the admin gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    /// No session, or session without sign-in
    Unauthenticated,
    /// Signed in but not on the allow-list
    Unauthorized,
    /// Admin page accessible
    Authorized,
}

/// Session state as reported to the admin page
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionResponse {
    pub status: AccessStatus,
    /// `shared_secret` or `allow_list`
    pub policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// OAuth client id for the sign-in button (`allow_list` policy only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_client_id: Option<String>,
}

// ========================================
// Error Response Types
// ========================================

/// Error body: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_status_snake_case() {
        let json = serde_json::to_value(AccessStatus::Unauthenticated).unwrap();
        assert_eq!(json, "unauthenticated");
    }

    #[test]
    fn test_login_request_accepts_either_field() {
        let req: LoginRequest = serde_json::from_str(r#"{"password":"x"}"#).unwrap();
        assert_eq!(req.password.as_deref(), Some("x"));
        assert!(req.id_token.is_none());

        let req: LoginRequest = serde_json::from_str(r#"{"id_token":"t"}"#).unwrap();
        assert_eq!(req.id_token.as_deref(), Some("t"));
    }
}
