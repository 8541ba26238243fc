//! Application context shared by every handler

use djsite_common::config::{RootFolderInitializer, SiteSettings};
use djsite_common::events::EventBus;
use djsite_common::{ReorderBoard, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{build_policy, AccessPolicy, SessionStore};
use crate::db::{init_database_pool, SetStore, SqliteSetStore};
use crate::services::SetPipeline;
use crate::storage::{BlobStore, FsBlobStore};

/// Event bus capacity; progress events of one upload come in bursts
const EVENT_BUS_CAPACITY: usize = 256;

/// One working board per admin session
pub type SessionBoard = Arc<RwLock<ReorderBoard>>;

/// Service handles plus the admins' working boards
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<SiteSettings>,
    pub store: Arc<dyn SetStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub policy: Arc<dyn AccessPolicy>,
    pub sessions: SessionStore,
    pub event_bus: EventBus,
    /// Working orders edited by drag gestures, keyed by session id
    boards: Arc<RwLock<HashMap<String, SessionBoard>>>,
    pub startup_time: Instant,
}

impl AppContext {
    pub fn new(
        settings: SiteSettings,
        store: Arc<dyn SetStore>,
        blobs: Arc<dyn BlobStore>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
            blobs,
            policy,
            sessions: SessionStore::new(),
            event_bus: EventBus::new(EVENT_BUS_CAPACITY),
            boards: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Instant::now(),
        }
    }

    /// Open the stores under the root folder
    pub async fn init(settings: SiteSettings) -> Result<Self> {
        let initializer = RootFolderInitializer::new(settings.root_folder.clone());
        initializer.ensure_directory_exists()?;

        let pool = init_database_pool(&initializer.database_path()).await?;
        let store: Arc<dyn SetStore> = Arc::new(SqliteSetStore::new(pool));
        let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(
            initializer.blob_root(),
            settings.public_base_url.clone(),
        ));
        let policy = build_policy(&settings);

        info!(
            root = %initializer.root().display(),
            policy = policy.kind().as_str(),
            "Application context initialized"
        );

        let ctx = Self::new(settings, store, blobs, policy);
        info!("Catalog holds {} sets", ctx.store.count().await?);
        Ok(ctx)
    }

    /// Pipelines bound to this context's stores
    pub fn pipeline(&self) -> SetPipeline {
        SetPipeline::new(
            self.store.clone(),
            self.blobs.clone(),
            self.event_bus.clone(),
            self.settings.cleanup_orphans,
        )
    }

    /// Working board of a session, loaded from the store on first use
    pub async fn board(&self, session_id: &str) -> Result<SessionBoard> {
        if let Some(board) = self.boards.read().await.get(session_id) {
            return Ok(board.clone());
        }
        let sets = self.store.list_ordered().await?;
        let mut boards = self.boards.write().await;
        let board = boards
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(ReorderBoard::new(sets))));
        Ok(board.clone())
    }

    /// Replace a session's working board with the stored order; returns its length
    pub async fn reload_board(&self, session_id: &str) -> Result<usize> {
        let sets = self.store.list_ordered().await?;
        let count = sets.len();
        let board = {
            let mut boards = self.boards.write().await;
            boards
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(ReorderBoard::default())))
                .clone()
        };
        board.write().await.reload(sets);
        Ok(count)
    }

    /// Size of the session's loaded list (not re-queried)
    pub async fn loaded_count(&self, session_id: &str) -> Result<usize> {
        let board = self.board(session_id).await?;
        let count = board.read().await.len();
        Ok(count)
    }

    /// Sign-out: drop the session and its working board
    pub async fn clear(&self, session_id: &str) {
        self.policy.sign_out(&self.sessions, session_id).await;
        self.boards.write().await.remove(session_id);
    }
}
