//! # djsite common library
//!
//! Shared code for the DJ site service:
//! - Set catalog models
//! - Error types
//! - Configuration loading and root folder resolution
//! - Event types (SiteEvent enum) and the EventBus
//! - Duration and progress ETA formatting
//! - The drag-and-drop reorder board
//! - Access helpers (shared secret comparison, session tokens, allow-lists)

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod models;
pub mod reorder;
pub mod sse;
pub mod time;

pub use error::{Error, Result};
pub use models::{NewSet, OrderAssignment, SetPatch, SetRecord};
pub use reorder::ReorderBoard;
