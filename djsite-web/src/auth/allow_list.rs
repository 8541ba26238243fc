//! Federated sign-in gated by an email allow-list

use async_trait::async_trait;
use djsite_common::api::email_is_allowed;
use djsite_common::config::AccessPolicyKind;
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    AccessPolicy, AccessState, AuthError, Credentials, IdentityProvider, Principal, SessionStore,
};

const UID_KEY: &str = "uid";
const EMAIL_KEY: &str = "email";
const DISPLAY_NAME_KEY: &str = "display_name";

pub struct AllowListPolicy {
    provider: Arc<dyn IdentityProvider>,
    /// Lower-cased; empty admits every signed-in user
    allowed_emails: Vec<String>,
}

impl AllowListPolicy {
    pub fn new(provider: Arc<dyn IdentityProvider>, allowed_emails: Vec<String>) -> Self {
        if allowed_emails.is_empty() {
            warn!("Admin email allow-list is empty; every signed-in user is authorized");
        }
        Self {
            provider,
            allowed_emails,
        }
    }

    fn evaluate(&self, principal: Principal) -> AccessState {
        if email_is_allowed(&self.allowed_emails, principal.email.as_deref()) {
            AccessState::Authorized(principal)
        } else {
            AccessState::Unauthorized {
                email: principal.email,
            }
        }
    }
}

#[async_trait]
impl AccessPolicy for AllowListPolicy {
    fn kind(&self) -> AccessPolicyKind {
        AccessPolicyKind::AllowList
    }

    async fn sign_in(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        credentials: Credentials,
    ) -> Result<AccessState, AuthError> {
        let Credentials::IdentityToken(token) = credentials else {
            return Err(AuthError::MissingCredentials("id_token"));
        };

        let principal = self.provider.resolve(&token).await?;

        sessions.set(session_id, UID_KEY, principal.uid.clone()).await;
        if let Some(email) = &principal.email {
            sessions.set(session_id, EMAIL_KEY, email.clone()).await;
        }
        if let Some(name) = &principal.display_name {
            sessions.set(session_id, DISPLAY_NAME_KEY, name.clone()).await;
        }

        let state = self.evaluate(principal);
        match &state {
            AccessState::Authorized(p) => info!(uid = %p.uid, "Admin signed in"),
            _ => warn!("Signed-in user is not on the admin allow-list"),
        }
        Ok(state)
    }

    async fn access_state(&self, sessions: &SessionStore, session_id: &str) -> AccessState {
        let Some(uid) = sessions.get(session_id, UID_KEY).await else {
            return AccessState::Unauthenticated;
        };
        let principal = Principal {
            uid,
            email: sessions.get(session_id, EMAIL_KEY).await,
            display_name: sessions.get(session_id, DISPLAY_NAME_KEY).await,
        };
        self.evaluate(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolves `token:<email>` to a user with that email
    struct FakeProvider;

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
            let email = token
                .strip_prefix("token:")
                .ok_or_else(|| AuthError::Identity("bad token".to_string()))?;
            Ok(Principal {
                uid: format!("uid-{}", email),
                email: Some(email.to_lowercase()),
                display_name: None,
            })
        }
    }

    fn policy(allowed: &[&str]) -> AllowListPolicy {
        AllowListPolicy::new(
            Arc::new(FakeProvider),
            allowed.iter().map(|s| s.to_string()).collect(),
        )
    }

    async fn sign_in(policy: &AllowListPolicy, sessions: &SessionStore, token: &str) -> AccessState {
        policy
            .sign_in(sessions, "sid", Credentials::IdentityToken(token.to_string()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_list_authorizes_everyone() {
        let policy = policy(&[]);
        let sessions = SessionStore::new();
        assert!(sign_in(&policy, &sessions, "token:anyone@example.com").await.is_authorized());
    }

    #[tokio::test]
    async fn test_non_member_is_unauthorized_not_unauthenticated() {
        let policy = policy(&["dj@example.com"]);
        let sessions = SessionStore::new();

        let state = sign_in(&policy, &sessions, "token:fan@example.com").await;
        assert_eq!(
            state,
            AccessState::Unauthorized {
                email: Some("fan@example.com".to_string())
            }
        );
        // Persisted: reload still knows who signed in
        assert_eq!(policy.access_state(&sessions, "sid").await, state);
    }

    #[tokio::test]
    async fn test_membership_is_case_insensitive() {
        let policy = policy(&["dj@example.com"]);
        let sessions = SessionStore::new();
        assert!(sign_in(&policy, &sessions, "token:DJ@Example.COM").await.is_authorized());
        assert!(policy.access_state(&sessions, "sid").await.is_authorized());
    }

    #[tokio::test]
    async fn test_failed_resolution_keeps_session_empty() {
        let policy = policy(&[]);
        let sessions = SessionStore::new();
        let result = policy
            .sign_in(&sessions, "sid", Credentials::IdentityToken("garbage".to_string()))
            .await;
        assert!(matches!(result, Err(AuthError::Identity(_))));
        assert_eq!(
            policy.access_state(&sessions, "sid").await,
            AccessState::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_sign_out_returns_to_unauthenticated() {
        let policy = policy(&[]);
        let sessions = SessionStore::new();
        sign_in(&policy, &sessions, "token:a@b.c").await;
        policy.sign_out(&sessions, "sid").await;
        assert_eq!(
            policy.access_state(&sessions, "sid").await,
            AccessState::Unauthenticated
        );
    }
}
