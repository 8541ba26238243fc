//! Catalog reader
//!
//! Ordered set list for the public page, with a retrieval URL resolved for
//! each set's audio. A set whose URL cannot be resolved is still listed,
//! just without audio.

use djsite_common::{Result, SetRecord};
use serde::Serialize;
use tracing::warn;

use crate::db::SetStore;
use crate::storage::BlobStore;

/// Set as shown on the public page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub set: SetRecord,
    pub audio_url: Option<String>,
}

pub async fn load_public_catalog(
    store: &dyn SetStore,
    blobs: &dyn BlobStore,
) -> Result<Vec<CatalogEntry>> {
    let sets = store.list_ordered().await?;
    let mut entries = Vec::with_capacity(sets.len());

    for set in sets {
        let audio_url = match set.stored_audio_path() {
            Some(key) => match blobs.url(key).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(set_id = %set.id, "Audio URL unavailable: {}", e);
                    None
                }
            },
            None => None,
        };
        entries.push(CatalogEntry { set, audio_url });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_memory_pool, SqliteSetStore};
    use crate::storage::{BlobMetadata, FsBlobStore};
    use axum::body::Bytes;
    use djsite_common::NewSet;

    fn new_set(title: &str, order: i64, audio_path: Option<&str>) -> NewSet {
        NewSet {
            title: title.to_string(),
            description: String::new(),
            duration: "1:00".to_string(),
            order,
            image_url: String::new(),
            audio_path: audio_path.map(str::to_string),
            created_at: order,
        }
    }

    #[tokio::test]
    async fn test_missing_blob_keeps_set_without_audio() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobStore::new(dir.path().to_path_buf(), "");
        let store = SqliteSetStore::new(init_memory_pool().await.unwrap());

        blobs
            .upload("sets/1-a.mp3", Bytes::from_static(b"a"), BlobMetadata::default(), &|_| {})
            .await
            .unwrap();
        store.create(new_set("Present", 1, Some("sets/1-a.mp3"))).await.unwrap();
        store.create(new_set("Gone", 2, Some("sets/2-gone.mp3"))).await.unwrap();
        store.create(new_set("Silent", 3, None)).await.unwrap();

        let catalog = load_public_catalog(&store, &blobs).await.unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].audio_url.as_deref(), Some("/blobs/sets/1-a.mp3"));
        assert_eq!(catalog[1].set.title, "Gone");
        assert!(catalog[1].audio_url.is_none());
        assert!(catalog[2].audio_url.is_none());
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = CatalogEntry {
            set: new_set("Flat", 1, None).into_record("id-1".to_string()),
            audio_url: Some("/blobs/x".to_string()),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["title"], "Flat");
        assert_eq!(json["audioUrl"], "/blobs/x");
        assert_eq!(json["imageUrl"], "");
    }
}
