//! Upload, edit and delete pipelines for sets
//!
//! Each run reports blob transfer progress on the event bus and finishes with
//! exactly one notification (success or error). Blobs uploaded by a run are
//! tracked; if a later step fails and `cleanup_orphans` is on, they are
//! deleted again so no unreferenced blob stays behind.

use axum::body::Bytes;
use djsite_common::events::{EventBus, SiteEvent, UploadKind};
use djsite_common::human_time::format_eta;
use djsite_common::time::now_millis;
use djsite_common::{Error, NewSet, Result, SetPatch, SetRecord};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::duration_probe::derive_duration_text;
use crate::db::SetStore;
use crate::storage::{audio_key, image_key, BlobMetadata, BlobStore, TransferProgress};

/// One file received from the admin form
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Admin form contents for upload and edit
#[derive(Debug, Clone, Default)]
pub struct SetForm {
    pub title: String,
    pub description: String,
    pub audio: Option<FileUpload>,
    pub image: Option<FileUpload>,
}

/// Blob keys written during one run
#[derive(Debug, Default)]
struct UploadLedger {
    keys: Vec<String>,
}

impl UploadLedger {
    fn record(&mut self, key: &str) {
        self.keys.push(key.to_string());
    }
}

/// Set mutations with progress, notifications and orphan cleanup
#[derive(Clone)]
pub struct SetPipeline {
    store: Arc<dyn SetStore>,
    blobs: Arc<dyn BlobStore>,
    event_bus: EventBus,
    cleanup_orphans: bool,
}

impl SetPipeline {
    pub fn new(
        store: Arc<dyn SetStore>,
        blobs: Arc<dyn BlobStore>,
        event_bus: EventBus,
        cleanup_orphans: bool,
    ) -> Self {
        Self {
            store,
            blobs,
            event_bus,
            cleanup_orphans,
        }
    }

    /// Publish a new set
    ///
    /// `loaded_count` is the size of the caller's loaded list; the new record
    /// is placed after it (`order = loaded_count + 1`).
    pub async fn upload(&self, form: SetForm, loaded_count: usize) -> Result<SetRecord> {
        let upload_id = Uuid::new_v4();
        let mut ledger = UploadLedger::default();

        let result = self.run_upload(upload_id, form, loaded_count, &mut ledger).await;

        match &result {
            Ok(record) => info!(set_id = %record.id, order = record.order, "Set uploaded"),
            Err(e) => error!(upload_id = %upload_id, "Set upload failed: {}", e),
        }
        self.finish(upload_id, &result, ledger, "Set uploaded successfully", "Upload failed")
            .await;
        result
    }

    /// Change an existing set, optionally replacing its audio and cover
    pub async fn edit(&self, id: &str, form: SetForm) -> Result<SetRecord> {
        let upload_id = Uuid::new_v4();
        let mut ledger = UploadLedger::default();

        let result = self.run_edit(upload_id, id, form, &mut ledger).await;

        match &result {
            Ok(_) => info!(set_id = %id, "Set updated"),
            Err(e) => error!(set_id = %id, "Set update failed: {}", e),
        }
        self.finish(upload_id, &result, ledger, "Set updated", "Update failed")
            .await;
        result
    }

    /// Remove a set and, best-effort, its audio blob
    ///
    /// The cover image blob is left in place.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.run_delete(id).await;

        match &result {
            Ok(()) => {
                info!(set_id = %id, "Set deleted");
                self.event_bus.catalog_changed();
                self.event_bus.notify_success("Set deleted");
            }
            Err(e) => {
                error!(set_id = %id, "Set delete failed: {}", e);
                self.event_bus.notify_error(format!("Delete failed: {}", e));
            }
        }
        result
    }

    async fn run_upload(
        &self,
        upload_id: Uuid,
        form: SetForm,
        loaded_count: usize,
        ledger: &mut UploadLedger,
    ) -> Result<SetRecord> {
        let started_ms = now_millis();

        let audio = form
            .audio
            .ok_or_else(|| Error::InvalidInput("Select an audio file".to_string()))?;

        let title = effective_title(&form.title, &audio.file_name);

        let audio_path = audio_key(started_ms, &audio.file_name);
        self.store_file(
            upload_id,
            UploadKind::Audio,
            &audio_path,
            &audio,
            Some(title.as_str()),
            ledger,
        )
        .await?;

        let duration = derive_duration_text(audio.data.clone()).await;

        let image_url = match &form.image {
            Some(image) => self.store_image(upload_id, image, ledger).await?,
            None => String::new(),
        };

        let new_set = NewSet {
            title,
            description: form.description,
            duration,
            order: loaded_count as i64 + 1,
            image_url,
            audio_path: Some(audio_path),
            created_at: started_ms,
        };

        self.store.create(new_set).await
    }

    async fn run_edit(
        &self,
        upload_id: Uuid,
        id: &str,
        form: SetForm,
        ledger: &mut UploadLedger,
    ) -> Result<SetRecord> {
        let mut record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Set not found: {}", id)))?;

        let title = effective_title(&form.title, &record.title);
        let mut patch = SetPatch {
            title: Some(title.clone()),
            description: Some(form.description),
            ..Default::default()
        };

        if let Some(audio) = &form.audio {
            // Old audio goes first; if the new upload then fails the set has none
            if let Some(old_key) = record.stored_audio_path() {
                self.delete_blob_best_effort(old_key).await;
            }

            let key = audio_key(now_millis(), &audio.file_name);
            self.store_file(
                upload_id,
                UploadKind::Audio,
                &key,
                audio,
                Some(title.as_str()),
                ledger,
            )
            .await?;

            patch.duration = Some(derive_duration_text(audio.data.clone()).await);
            patch.audio_path = Some(key);
        }

        if let Some(image) = &form.image {
            patch.image_url = Some(self.store_image(upload_id, image, ledger).await?);
        }

        self.store.update(id, &patch).await?;
        record.apply(&patch);
        Ok(record)
    }

    async fn run_delete(&self, id: &str) -> Result<()> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Set not found: {}", id)))?;

        self.store.delete(id).await?;

        if let Some(key) = record.stored_audio_path() {
            self.delete_blob_best_effort(key).await;
        }
        Ok(())
    }

    async fn store_image(
        &self,
        upload_id: Uuid,
        image: &FileUpload,
        ledger: &mut UploadLedger,
    ) -> Result<String> {
        let key = image_key(now_millis(), &image.file_name);
        self.store_file(upload_id, UploadKind::Image, &key, image, None, ledger)
            .await?;
        self.blobs.url(&key).await
    }

    async fn store_file(
        &self,
        upload_id: Uuid,
        kind: UploadKind,
        key: &str,
        file: &FileUpload,
        title: Option<&str>,
        ledger: &mut UploadLedger,
    ) -> Result<()> {
        let mut custom = BTreeMap::new();
        if let Some(title) = title {
            custom.insert("title".to_string(), title.to_string());
        }
        let metadata = BlobMetadata {
            content_type: file.content_type.clone(),
            custom,
        };

        debug!(key = %key, bytes = file.data.len(), "{} upload started", kind.label());
        let report = progress_reporter(self.event_bus.clone(), upload_id, kind);
        self.blobs
            .upload(key, file.data.clone(), metadata, &report)
            .await?;
        ledger.record(key);
        Ok(())
    }

    async fn delete_blob_best_effort(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            warn!(key = %key, "Could not delete blob: {}", e);
        }
    }

    async fn finish<T>(
        &self,
        upload_id: Uuid,
        result: &Result<T>,
        ledger: UploadLedger,
        success_message: &str,
        failure_message: &str,
    ) {
        match result {
            Ok(_) => {
                self.event_bus.emit_lossy(SiteEvent::UploadFinished {
                    upload_id,
                    succeeded: true,
                    timestamp: chrono::Utc::now(),
                });
                self.event_bus.catalog_changed();
                self.event_bus.notify_success(success_message);
            }
            Err(e) => {
                if self.cleanup_orphans {
                    for key in &ledger.keys {
                        debug!(key = %key, "Removing blob of failed run");
                        self.delete_blob_best_effort(key).await;
                    }
                } else if !ledger.keys.is_empty() {
                    warn!(keys = ?ledger.keys, "Leaving blobs of failed run in place");
                }
                self.event_bus.emit_lossy(SiteEvent::UploadFinished {
                    upload_id,
                    succeeded: false,
                    timestamp: chrono::Utc::now(),
                });
                self.event_bus
                    .notify_error(format!("{}: {}", failure_message, e));
            }
        }
    }
}

/// Trimmed form title, or `fallback` when blank
fn effective_title(form_title: &str, fallback: &str) -> String {
    let trimmed = form_title.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Progress callback publishing `UploadProgress` events with an ETA
fn progress_reporter(
    event_bus: EventBus,
    upload_id: Uuid,
    kind: UploadKind,
) -> impl Fn(TransferProgress) + Send + Sync {
    let started = Instant::now();
    move |progress: TransferProgress| {
        let percent = progress.percent();
        event_bus.emit_lossy(SiteEvent::UploadProgress {
            upload_id,
            kind,
            percent,
            eta: format_eta(percent, Some(started.elapsed())),
            timestamp: chrono::Utc::now(),
        });
    }
}
