//! Password gate: one configured secret, one session flag

use async_trait::async_trait;
use djsite_common::api::secrets_match;
use djsite_common::config::AccessPolicyKind;
use tracing::{info, warn};

use super::{AccessPolicy, AccessState, AuthError, Credentials, Principal, SessionStore};

const AUTHENTICATED_KEY: &str = "authenticated";

pub struct SharedSecretPolicy {
    /// `None` disables sign-in entirely
    secret: Option<String>,
}

impl SharedSecretPolicy {
    pub fn new(secret: Option<String>) -> Self {
        if secret.is_none() {
            warn!("No admin password configured; admin sign-in is disabled");
        }
        Self { secret }
    }

    fn admin() -> Principal {
        Principal {
            uid: "admin".to_string(),
            email: None,
            display_name: None,
        }
    }
}

#[async_trait]
impl AccessPolicy for SharedSecretPolicy {
    fn kind(&self) -> AccessPolicyKind {
        AccessPolicyKind::SharedSecret
    }

    async fn sign_in(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        credentials: Credentials,
    ) -> Result<AccessState, AuthError> {
        let Credentials::Password(password) = credentials else {
            return Err(AuthError::MissingCredentials("password"));
        };
        let Some(secret) = &self.secret else {
            return Err(AuthError::Disabled);
        };

        if !secrets_match(&password, secret) {
            return Err(AuthError::InvalidPassword);
        }

        sessions.set(session_id, AUTHENTICATED_KEY, "true").await;
        info!("Admin signed in with password");
        Ok(AccessState::Authorized(Self::admin()))
    }

    async fn access_state(&self, sessions: &SessionStore, session_id: &str) -> AccessState {
        match sessions.get(session_id, AUTHENTICATED_KEY).await.as_deref() {
            Some("true") => AccessState::Authorized(Self::admin()),
            _ => AccessState::Unauthenticated,
        }
    }
}
