//! Session-scoped key/value store and the session cookie
//!
//! Sessions live in memory, keyed by a random id carried in the
//! `djsite_session` cookie. They survive page reloads, not server restarts.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "djsite_session";

type SessionMap = HashMap<String, HashMap<String, String>>;

/// Session id of an admitted admin request, attached by the admin gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

/// In-memory session flags keyed by session id
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionMap>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str, key: &str) -> Option<String> {
        let sessions = self.inner.read().await;
        sessions.get(session_id)?.get(key).cloned()
    }

    pub async fn set(&self, session_id: &str, key: &str, value: impl Into<String>) {
        let mut sessions = self.inner.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Drop every flag of a session
    pub async fn clear(&self, session_id: &str) {
        self.inner.write().await.remove(session_id);
    }
}

/// Session id from the request's `Cookie` headers
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the browser to `session_id`
pub fn session_cookie(session_id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, session_id)
}

/// `Set-Cookie` value that removes the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
