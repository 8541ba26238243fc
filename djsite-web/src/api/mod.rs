//! HTTP API handlers for djsite-web

pub mod auth;
pub mod blobs;
pub mod board;
pub mod catalog;
pub mod health;
pub mod session;
pub mod sets;
pub mod sse;
pub mod ui;

pub use auth::require_admin;
pub use blobs::fetch_blob;
pub use catalog::{admin_sets, public_sets};
pub use health::health_routes;
pub use session::{login, logout, session_status};
pub use sets::{create_set, delete_set, update_set};
pub use sse::admin_event_stream;
pub use ui::{serve_admin, serve_admin_js, serve_index};
