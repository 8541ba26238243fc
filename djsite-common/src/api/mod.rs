//! API module for shared access-gate functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared request/response types
//!
//! The web service wraps these with axum middleware and handlers.

pub mod auth;
pub mod types;

pub use auth::{
    email_is_allowed, generate_session_token, parse_allowed_emails, secrets_match,
};
pub use types::{AccessStatus, ErrorBody, LoginRequest, SessionResponse};
