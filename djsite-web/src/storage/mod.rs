//! Blob store for set audio and cover images
//!
//! `BlobStore` is the seam to object storage. Objects are addressed by
//! slash-separated keys such as `sets/1730000000000-warmup.mp3`. The shipped
//! backend keeps objects on the local filesystem (`FsBlobStore`).

mod fs;

pub use fs::FsBlobStore;

use async_trait::async_trait;
use axum::body::Bytes;
use djsite_common::human_time::transfer_percent;
use djsite_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key prefix for set audio
pub const AUDIO_PREFIX: &str = "sets";
/// Key prefix for cover images
pub const IMAGE_PREFIX: &str = "sets/images";

/// Byte counters reported while an upload runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Rounded completion percentage
    pub fn percent(&self) -> u8 {
        transfer_percent(self.bytes_transferred, self.total_bytes)
    }
}

/// Progress callback, invoked on every progress event of one upload
pub type ProgressFn<'a> = &'a (dyn Fn(TransferProgress) + Send + Sync);

/// Metadata stored alongside an object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Free-form key/value pairs (e.g. `title`)
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

/// Object contents plus its metadata
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub data: Bytes,
    pub metadata: BlobMetadata,
}

/// Keyed object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object
    ///
    /// `progress` is called at least once, the last call reporting all bytes.
    /// On error nothing is left under `key`.
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        metadata: BlobMetadata,
        progress: ProgressFn<'_>,
    ) -> Result<()>;

    /// Retrieval URL for an existing object (`Error::NotFound` otherwise)
    async fn url(&self, key: &str) -> Result<String>;

    /// Remove an object (`Error::NotFound` if absent)
    async fn delete(&self, key: &str) -> Result<()>;

    /// Direct binary fetch
    async fn fetch(&self, key: &str) -> Result<BlobObject>;
}

/// Reject keys that could escape the store or collide with its internals
///
/// Keys are relative, slash-separated, and no segment may be empty or start
/// with a dot (which also rules out `..`).
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidInput("Empty blob key".to_string()));
    }
    if key.contains('\\') || key.contains('\0') {
        return Err(Error::InvalidInput(format!("Invalid blob key: {}", key)));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment.starts_with('.') {
            return Err(Error::InvalidInput(format!("Invalid blob key: {}", key)));
        }
    }
    Ok(())
}

/// Make an uploaded file name safe to embed in a key and a URL
///
/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so the name cannot hide itself.
pub fn sanitize_file_name(name: &str) -> String {
    // Browsers on Windows may send full paths
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Key for a set's audio: `sets/{timestamp_ms}-{file_name}`
pub fn audio_key(timestamp_ms: i64, file_name: &str) -> String {
    format!("{}/{}-{}", AUDIO_PREFIX, timestamp_ms, sanitize_file_name(file_name))
}

/// Key for a cover image: `sets/images/{timestamp_ms}-{file_name}`
pub fn image_key(timestamp_ms: i64, file_name: &str) -> String {
    format!("{}/{}-{}", IMAGE_PREFIX, timestamp_ms, sanitize_file_name(file_name))
}
