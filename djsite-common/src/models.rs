//! Set catalog models
//!
//! A "set" is one published audio mix. Records are created by the upload
//! pipeline, mutated in place by edits and order saves, and destroyed by delete.

use serde::{Deserialize, Serialize};

/// Placeholder duration used when playback length could not be determined
pub const UNKNOWN_DURATION: &str = "--";

/// One catalog record as stored and served
///
/// JSON field names are camelCase (`imageUrl`, `audioPath`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    /// Opaque identifier assigned by the store
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `M:SS`, or `--` when undetermined
    pub duration: String,
    /// Display position (ascending)
    pub order: i64,
    /// Retrieval URL of the cover image, or empty
    #[serde(default)]
    pub image_url: String,
    /// Storage key of the audio blob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    /// Creation time, epoch milliseconds
    pub created_at: i64,
}

impl SetRecord {
    /// Key of the referenced audio blob; an empty path counts as none
    pub fn stored_audio_path(&self) -> Option<&str> {
        self.audio_path.as_deref().filter(|p| !p.is_empty())
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &SetPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(duration) = &patch.duration {
            self.duration = duration.clone();
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(audio_path) = &patch.audio_path {
            self.audio_path = Some(audio_path.clone());
        }
    }
}

/// Record contents before the store has assigned an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSet {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub order: i64,
    pub image_url: String,
    pub audio_path: Option<String>,
    pub created_at: i64,
}

impl NewSet {
    /// Attach a store-assigned identifier
    pub fn into_record(self, id: String) -> SetRecord {
        SetRecord {
            id,
            title: self.title,
            description: self.description,
            duration: self.duration,
            order: self.order,
            image_url: self.image_url,
            audio_path: self.audio_path,
            created_at: self.created_at,
        }
    }
}

/// Partial update: only the fields that are `Some` are written
///
/// There is no `created_at`: it never changes after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
}

impl SetPatch {
    /// True if the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.duration.is_none()
            && self.order.is_none()
            && self.image_url.is_none()
            && self.audio_path.is_none()
    }
}

/// One entry of a reorder batch: record `id` gets display position `order`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub id: String,
    pub order: i64,
}
