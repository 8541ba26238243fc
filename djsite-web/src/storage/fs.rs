//! Filesystem blob store
//!
//! Objects live at `<root>/<key>`; metadata in `<root>/.meta/<key>.json`.
//! Keys never contain dot-segments, so the metadata tree cannot collide with
//! an object. Uploads are written to a `.part` sibling and renamed into place.

use async_trait::async_trait;
use axum::body::Bytes;
use djsite_common::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{validate_key, BlobMetadata, BlobObject, BlobStore, ProgressFn, TransferProgress};

const META_DIR: &str = ".meta";
const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Blob store rooted at a local directory
pub struct FsBlobStore {
    root: PathBuf,
    /// Prefix for retrieval URLs (empty = site-relative)
    public_base_url: String,
    chunk_size: usize,
}

impl FsBlobStore {
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            root,
            public_base_url: public_base_url.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join(META_DIR).join(format!("{}.json", key))
    }

    async fn write_object(
        &self,
        path: &Path,
        data: &Bytes,
        progress: ProgressFn<'_>,
    ) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let total = data.len() as u64;
        let part_path = path.with_extension(part_extension(path));
        let mut file = tokio::fs::File::create(&part_path).await?;

        let write_result = async {
            if data.is_empty() {
                progress(TransferProgress { bytes_transferred: 0, total_bytes: 0 });
            }
            let mut written = 0u64;
            for chunk in data.chunks(self.chunk_size) {
                file.write_all(chunk).await?;
                written += chunk.len() as u64;
                progress(TransferProgress { bytes_transferred: written, total_bytes: total });
            }
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        drop(file);
        let result = match write_result {
            Ok(()) => tokio::fs::rename(&part_path, path).await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            let _ = tokio::fs::remove_file(&part_path).await;
        }
        result
    }

    async fn write_metadata(&self, key: &str, metadata: &BlobMetadata) -> Result<()> {
        let meta_path = self.meta_path(key);
        if let Some(parent) = meta_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let meta_json = serde_json::to_vec(metadata)
            .map_err(|e| Error::Internal(format!("Failed to serialize blob metadata: {}", e)))?;
        tokio::fs::write(&meta_path, meta_json).await?;
        Ok(())
    }
}

/// `mix.mp3` becomes `mix.mp3.part`
fn part_extension(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!("{}.part", ext.to_string_lossy()),
        None => "part".to_string(),
    }
}

fn not_found_or_io(key: &str, e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::NotFound {
        Error::NotFound(format!("Blob not found: {}", key))
    } else {
        Error::Io(e)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        metadata: BlobMetadata,
        progress: ProgressFn<'_>,
    ) -> Result<()> {
        let path = self.object_path(key)?;

        // Sidecar first: the object only appears under `key` once both are written
        self.write_metadata(key, &metadata).await?;

        if let Err(e) = self.write_object(&path, &data, progress).await {
            let _ = tokio::fs::remove_file(self.meta_path(key)).await;
            return Err(Error::Transfer(format!("Upload of {} failed: {}", key, e)));
        }

        debug!(key = %key, bytes = data.len(), "Blob stored");
        Ok(())
    }

    async fn url(&self, key: &str) -> Result<String> {
        let path = self.object_path(key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(Error::NotFound(format!("Blob not found: {}", key)));
        }
        Ok(format!("{}/blobs/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))?;

        // Metadata is advisory; a missing sidecar is fine
        let _ = tokio::fs::remove_file(self.meta_path(key)).await;

        debug!(key = %key, "Blob deleted");
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<BlobObject> {
        let path = self.object_path(key)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))?;

        let metadata = match tokio::fs::read(self.meta_path(key)).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_default(),
            Err(_) => BlobMetadata::default(),
        };

        Ok(BlobObject {
            data: Bytes::from(data),
            metadata,
        })
    }
}
