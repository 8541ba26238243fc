//! Admin access policies
//!
//! Exactly one `AccessPolicy` runs per process, picked by configuration:
//! - `SharedSecretPolicy`: password against a configured secret
//! - `AllowListPolicy`: federated identity token plus an email allow-list
//!
//! Both keep their state in the `SessionStore` under the caller's session id.

mod allow_list;
mod identity;
mod session;
mod shared_secret;

pub use allow_list::AllowListPolicy;
pub use identity::{GoogleIdentityProvider, IdentityProvider};
pub use session::{
    expired_session_cookie, session_cookie, session_id_from_headers, SessionId, SessionStore,
    SESSION_COOKIE,
};
pub use shared_secret::SharedSecretPolicy;

use async_trait::async_trait;
use djsite_common::api::{AccessStatus, LoginRequest};
use djsite_common::config::{AccessPolicyKind, SiteSettings};
use std::sync::Arc;
use thiserror::Error;

/// What the caller presents to sign in
#[derive(Debug, Clone)]
pub enum Credentials {
    Password(String),
    IdentityToken(String),
}

impl Credentials {
    /// Pick the credential the given policy expects from a login body
    pub fn from_login(kind: AccessPolicyKind, request: LoginRequest) -> Result<Self, AuthError> {
        match kind {
            AccessPolicyKind::SharedSecret => request
                .password
                .map(Credentials::Password)
                .ok_or(AuthError::MissingCredentials("password")),
            AccessPolicyKind::AllowList => request
                .id_token
                .filter(|t| !t.trim().is_empty())
                .map(Credentials::IdentityToken)
                .ok_or(AuthError::MissingCredentials("id_token")),
        }
    }
}

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Access state of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessState {
    Unauthenticated,
    /// Signed in, but not permitted to use the admin page
    Unauthorized { email: Option<String> },
    Authorized(Principal),
}

impl AccessState {
    pub fn status(&self) -> AccessStatus {
        match self {
            AccessState::Unauthenticated => AccessStatus::Unauthenticated,
            AccessState::Unauthorized { .. } => AccessStatus::Unauthorized,
            AccessState::Authorized(_) => AccessStatus::Authorized,
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, AccessState::Authorized(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect password")]
    InvalidPassword,

    #[error("Password sign-in is not configured")]
    Disabled,

    #[error("Missing credential: {0}")]
    MissingCredentials(&'static str),

    #[error("Sign-in failed: {0}")]
    Identity(String),
}

/// Gate in front of the admin surface
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    fn kind(&self) -> AccessPolicyKind;

    /// Sign the session in; on failure the session is left untouched
    async fn sign_in(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        credentials: Credentials,
    ) -> Result<AccessState, AuthError>;

    /// Current state, re-read from the session store
    async fn access_state(&self, sessions: &SessionStore, session_id: &str) -> AccessState;

    async fn sign_out(&self, sessions: &SessionStore, session_id: &str) {
        sessions.clear(session_id).await;
    }
}

/// Build the configured policy
pub fn build_policy(settings: &SiteSettings) -> Arc<dyn AccessPolicy> {
    match settings.access_policy {
        AccessPolicyKind::SharedSecret => {
            Arc::new(SharedSecretPolicy::new(settings.admin_password.clone()))
        }
        AccessPolicyKind::AllowList => {
            let provider = GoogleIdentityProvider::new(settings.google_client_id.clone());
            Arc::new(AllowListPolicy::new(
                Arc::new(provider),
                settings.admin_emails.clone(),
            ))
        }
    }
}
