//! Event types for the djsite event system
//!
//! Provides the shared event definitions and the EventBus. Admin clients
//! receive these over SSE: upload progress bars, toast notifications and
//! catalog refresh hints.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Which file of an upload a progress event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Audio,
    Image,
}

impl UploadKind {
    pub fn label(&self) -> &'static str {
        match self {
            UploadKind::Audio => "Audio",
            UploadKind::Image => "Image",
        }
    }
}

/// Notification severity (toast style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// Site event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SiteEvent {
    /// Blob transfer progressed
    UploadProgress {
        /// Identifies one pipeline run (audio and image share it)
        upload_id: Uuid,
        kind: UploadKind,
        /// 0-100, rounded
        percent: u8,
        /// `M:SS`, `done` or `--`
        eta: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Pipeline run ended (either way); clients drop its progress bars
    UploadFinished {
        upload_id: Uuid,
        succeeded: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User-facing notification
    Notification {
        level: NotificationLevel,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Catalog contents or order changed; clients should re-fetch
    CatalogChanged {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SiteEvent {
    /// Event type name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            SiteEvent::UploadProgress { .. } => "UploadProgress",
            SiteEvent::UploadFinished { .. } => "UploadFinished",
            SiteEvent::Notification { .. } => "Notification",
            SiteEvent::CatalogChanged { .. } => "CatalogChanged",
        }
    }

    pub fn notification(level: NotificationLevel, message: impl Into<String>) -> Self {
        SiteEvent::Notification {
            level,
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Broadcast bus for SiteEvents
///
/// Cloning is cheap; clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SiteEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use djsite_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// let mut rx = event_bus.subscribe();
    /// event_bus.notify_success("Order saved");
    /// assert!(rx.try_recv().is_ok());
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SiteEvent) {
        let _ = self.tx.send(event);
    }

    /// Emit a success notification
    pub fn notify_success(&self, message: impl Into<String>) {
        self.emit_lossy(SiteEvent::notification(NotificationLevel::Success, message));
    }

    /// Emit an error notification
    pub fn notify_error(&self, message: impl Into<String>) {
        self.emit_lossy(SiteEvent::notification(NotificationLevel::Error, message));
    }

    /// Tell clients the catalog needs re-fetching
    pub fn catalog_changed(&self) {
        self.emit_lossy(SiteEvent::CatalogChanged {
            timestamp: chrono::Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = SiteEvent::UploadProgress {
            upload_id: Uuid::nil(),
            kind: UploadKind::Audio,
            percent: 42,
            eta: "1:05".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "UploadProgress");
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["percent"], 42);
        assert_eq!(event.event_type(), "UploadProgress");
    }

    #[tokio::test]
    async fn test_notify_reaches_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.notify_error("Upload failed");

        match rx.recv().await.unwrap() {
            SiteEvent::Notification { level, message, .. } => {
                assert_eq!(level, NotificationLevel::Error);
                assert_eq!(message, "Upload failed");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(10);
        bus.catalog_changed();

        // Late subscribers only see later events
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
        bus.notify_success("Set deleted");
        assert!(matches!(rx.try_recv(), Ok(SiteEvent::Notification { .. })));
    }
}
