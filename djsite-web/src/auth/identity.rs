//! Identity provider for federated sign-in

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{AuthError, Principal};

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Resolves a sign-in token to the user it was issued for
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Subset of Google's tokeninfo response
#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    #[serde(default)]
    aud: Option<String>,
    #[serde(default)]
    email: Option<String>,
    /// Google sends `"true"`/`"false"` strings here
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
}

impl TokenInfo {
    fn email_verified(&self) -> bool {
        match &self.email_verified {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

/// Verifies Google ID tokens with the tokeninfo endpoint
pub struct GoogleIdentityProvider {
    http_client: reqwest::Client,
    /// Expected `aud`; unchecked when `None`
    client_id: Option<String>,
    endpoint: String,
}

impl GoogleIdentityProvider {
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            client_id,
            endpoint: GOOGLE_TOKENINFO_URL.to_string(),
        }
    }

    /// Point at a different tokeninfo-compatible endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn principal_from(&self, info: TokenInfo) -> Result<Principal, AuthError> {
        if let (Some(expected), Some(aud)) = (&self.client_id, &info.aud) {
            if expected != aud {
                warn!(aud = %aud, "Identity token issued for another client");
                return Err(AuthError::Identity("token audience mismatch".to_string()));
            }
        } else if self.client_id.is_some() {
            return Err(AuthError::Identity("token has no audience".to_string()));
        }

        // An unverified address must not match the allow-list
        let email = if info.email_verified() {
            info.email.map(|e| e.to_lowercase())
        } else {
            None
        };

        Ok(Principal {
            uid: info.sub,
            email,
            display_name: info.name,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        debug!("Verifying identity token");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| AuthError::Identity(format!("identity provider unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Identity(format!(
                "token rejected ({})",
                status.as_u16()
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::Identity(format!("unreadable token info: {}", e)))?;

        self.principal_from(info)
    }
}
