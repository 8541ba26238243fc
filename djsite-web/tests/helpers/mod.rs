//! Shared fixtures for djsite-web integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use djsite_common::config::{AccessPolicyKind, SettingsOverrides, SiteSettings, TomlConfig};
use djsite_common::events::SiteEvent;
use djsite_common::{Error, NewSet, OrderAssignment, Result, SetPatch, SetRecord};
use djsite_web::db::{init_memory_pool, SetStore, SqliteSetStore};
use djsite_web::storage::{BlobMetadata, BlobObject, BlobStore, ProgressFn, TransferProgress};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Blob operation as observed by `RecordingBlobStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobOp {
    Upload(String),
    Url(String),
    Delete(String),
    Fetch(String),
}

/// In-memory blob store that logs every call
#[derive(Default)]
pub struct RecordingBlobStore {
    objects: Mutex<HashMap<String, (Bytes, BlobMetadata)>>,
    ops: Mutex<Vec<BlobOp>>,
    /// Uploads whose key starts with this prefix fail
    fail_uploads_with_prefix: Option<String>,
}

impl RecordingBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads(prefix: &str) -> Self {
        Self {
            fail_uploads_with_prefix: Some(prefix.to_string()),
            ..Default::default()
        }
    }

    pub fn ops(&self) -> Vec<BlobOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                BlobOp::Delete(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                BlobOp::Upload(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn metadata(&self, key: &str) -> Option<BlobMetadata> {
        self.objects.lock().unwrap().get(key).map(|(_, m)| m.clone())
    }

    /// Put an object in place without logging an operation
    pub fn seed(&self, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (Bytes::from_static(b"seed"), BlobMetadata::default()));
    }

    fn log(&self, op: BlobOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        metadata: BlobMetadata,
        progress: ProgressFn<'_>,
    ) -> Result<()> {
        self.log(BlobOp::Upload(key.to_string()));
        if let Some(prefix) = &self.fail_uploads_with_prefix {
            if key.starts_with(prefix.as_str()) {
                return Err(Error::Transfer(format!("simulated failure for {}", key)));
            }
        }

        let total = data.len() as u64;
        progress(TransferProgress { bytes_transferred: total / 2, total_bytes: total });
        progress(TransferProgress { bytes_transferred: total, total_bytes: total });

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, metadata));
        Ok(())
    }

    async fn url(&self, key: &str) -> Result<String> {
        self.log(BlobOp::Url(key.to_string()));
        if self.contains(key) {
            Ok(format!("https://blobs.test/{}", key))
        } else {
            Err(Error::NotFound(key.to_string()))
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.log(BlobOp::Delete(key.to_string()));
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(key.to_string())),
        }
    }

    async fn fetch(&self, key: &str) -> Result<BlobObject> {
        self.log(BlobOp::Fetch(key.to_string()));
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, metadata)| BlobObject {
                data: data.clone(),
                metadata: metadata.clone(),
            })
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }
}

/// SQLite store whose `create` always fails
pub struct FailingCreateStore {
    pub inner: SqliteSetStore,
}

#[async_trait]
impl SetStore for FailingCreateStore {
    async fn list_ordered(&self) -> Result<Vec<SetRecord>> {
        self.inner.list_ordered().await
    }

    async fn get(&self, id: &str) -> Result<Option<SetRecord>> {
        self.inner.get(id).await
    }

    async fn create(&self, _new_set: NewSet) -> Result<SetRecord> {
        Err(Error::Internal("store offline".to_string()))
    }

    async fn update(&self, id: &str, patch: &SetPatch) -> Result<()> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn apply_order(&self, batch: &[OrderAssignment]) -> Result<()> {
        self.inner.apply_order(batch).await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

pub async fn memory_store() -> SqliteSetStore {
    SqliteSetStore::new(init_memory_pool().await.unwrap())
}

pub fn new_set(title: &str, order: i64, audio_path: Option<&str>) -> NewSet {
    NewSet {
        title: title.to_string(),
        description: format!("{} description", title),
        duration: "1:00".to_string(),
        order,
        image_url: String::new(),
        audio_path: audio_path.map(str::to_string),
        created_at: order,
    }
}

/// Mono 16-bit silence of the given length, as WAV bytes
pub fn wav_bytes(seconds: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 4000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..(spec.sample_rate * seconds) {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Everything currently queued on a receiver
pub fn drain(rx: &mut broadcast::Receiver<SiteEvent>) -> Vec<SiteEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Settings for tests: fixed root, chosen policy, no env lookups
pub fn test_settings(root: &std::path::Path, policy: AccessPolicyKind) -> SiteSettings {
    let overrides = SettingsOverrides {
        root_folder: Some(root.to_path_buf()),
        bind_address: Some("127.0.0.1:0".to_string()),
        access_policy: Some(policy),
    };
    let toml = TomlConfig {
        admin_password: Some("letmein".to_string()),
        ..Default::default()
    };
    SiteSettings::from_sources(&overrides, toml, |_| None).unwrap()
}
