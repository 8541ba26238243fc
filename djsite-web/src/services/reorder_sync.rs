//! Persist the working board's order

use djsite_common::events::EventBus;
use djsite_common::{ReorderBoard, Result};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::db::SetStore;

/// Write `order = position + 1` for every board item as one batch
///
/// The board lock is not held while the store is written. On failure the
/// in-memory order stays as it is (unpersisted); nothing is retried.
pub async fn save_order(
    store: &dyn SetStore,
    board: &RwLock<ReorderBoard>,
    event_bus: &EventBus,
) -> Result<usize> {
    let (ids, batch) = {
        let board = board.read().await;
        (board.ids(), board.order_assignments())
    };

    match store.apply_order(&batch).await {
        Ok(()) => {
            let mut board = board.write().await;
            // A gesture during the write would make the renumbering wrong
            if board.ids() == ids {
                board.mark_saved();
            }
            info!(count = batch.len(), "Set order saved");
            event_bus.catalog_changed();
            event_bus.notify_success("Order saved");
            Ok(batch.len())
        }
        Err(e) => {
            error!("Saving set order failed: {}", e);
            event_bus.notify_error(format!("Saving order failed: {}", e));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_memory_pool, SqliteSetStore};
    use djsite_common::events::{NotificationLevel, SiteEvent};
    use djsite_common::NewSet;

    async fn seeded_store(titles: &[&str]) -> SqliteSetStore {
        let store = SqliteSetStore::new(init_memory_pool().await.unwrap());
        for (i, title) in titles.iter().enumerate() {
            store
                .create(NewSet {
                    title: title.to_string(),
                    description: String::new(),
                    duration: "--".to_string(),
                    order: i as i64 + 1,
                    image_url: String::new(),
                    audio_path: None,
                    created_at: i as i64,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_save_persists_board_order() {
        let store = seeded_store(&["A", "B", "C", "D"]).await;
        let board = RwLock::new(ReorderBoard::new(store.list_ordered().await.unwrap()));
        let bus = EventBus::new(16);

        {
            let mut b = board.write().await;
            b.drag_start(2);
            b.drop_at(0);
            b.drag_end();
        }

        assert_eq!(save_order(&store, &board, &bus).await.unwrap(), 4);

        let stored: Vec<(String, i64)> = store
            .list_ordered()
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.title, s.order))
            .collect();
        assert_eq!(
            stored,
            vec![
                ("C".to_string(), 1),
                ("A".to_string(), 2),
                ("B".to_string(), 3),
                ("D".to_string(), 4)
            ]
        );
        assert_eq!(board.read().await.items()[0].order, 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_board_and_notifies() {
        let store = seeded_store(&["A", "B"]).await;
        let mut items = store.list_ordered().await.unwrap();
        // Record deleted elsewhere since the board was loaded
        store.delete(&items[1].id).await.unwrap();
        items.swap(0, 1);
        let board = RwLock::new(ReorderBoard::new(items));
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        assert!(save_order(&store, &board, &bus).await.is_err());
        assert_eq!(board.read().await.items()[0].title, "B");

        match rx.recv().await.unwrap() {
            SiteEvent::Notification { level, .. } => assert_eq!(level, NotificationLevel::Error),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
