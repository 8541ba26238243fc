//! Access gate primitives
//!
//! Shared-secret comparison, session token generation and email allow-list
//! handling. Pure functions only; the policies in the web service build on them.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of a session token in random bytes (hex doubles it)
const SESSION_TOKEN_BYTES: usize = 32;

// ========================================
// Shared Secret
// ========================================

/// Compare a submitted password with the configured secret
///
/// Exact string equality. Both sides are digested with SHA-256 first so the
/// comparison time does not depend on where the strings first differ.
///
/// # Examples
///
/// ```
/// use djsite_common::api::auth::secrets_match;
///
/// assert!(secrets_match("hunter2", "hunter2"));
/// assert!(!secrets_match("hunter", "hunter2"));
/// assert!(!secrets_match("Hunter2", "hunter2"));
/// ```
pub fn secrets_match(submitted: &str, configured: &str) -> bool {
    let a = Sha256::digest(submitted.as_bytes());
    let b = Sha256::digest(configured.as_bytes());
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

// ========================================
// Session Tokens
// ========================================

/// Generate a random session identifier (64 hex chars)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ========================================
// Email Allow-list
// ========================================

/// Parse a comma-separated allow-list
///
/// Entries are trimmed and lower-cased; empty entries are dropped.
///
/// # Examples
///
/// ```
/// use djsite_common::api::auth::parse_allowed_emails;
///
/// let list = parse_allowed_emails(" DJ@Example.com, ,booking@example.com ");
/// assert_eq!(list, vec!["dj@example.com", "booking@example.com"]);
/// ```
pub fn parse_allowed_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Check an email against a normalized allow-list
///
/// An empty list allows every signed-in user. A missing email only passes an
/// empty list.
pub fn email_is_allowed(allowed: &[String], email: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let email = email.unwrap_or_default().trim().to_lowercase();
    allowed.iter().any(|a| *a == email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_exact_match_only() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret ", "s3cret"));
        assert!(!secrets_match("", "s3cret"));
    }

    #[test]
    fn test_empty_secret_matches_empty() {
        assert!(secrets_match("", ""));
    }

    #[test]
    fn test_session_token_shape() {
        let token = generate_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_session_token());
    }

    #[test]
    fn test_allow_list_case_insensitive() {
        let allowed = parse_allowed_emails("dj@example.com");
        assert!(email_is_allowed(&allowed, Some("DJ@Example.COM")));
        assert!(!email_is_allowed(&allowed, Some("fan@example.com")));
        assert!(!email_is_allowed(&allowed, None));
    }

    #[test]
    fn test_empty_allow_list_allows_everyone() {
        assert!(email_is_allowed(&[], Some("anyone@example.com")));
        assert!(email_is_allowed(&[], None));
    }
}
