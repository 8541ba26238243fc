//! Document store for set records
//!
//! `SetStore` is the seam to the persistence backend. The shipped backend is
//! SQLite (`SqliteSetStore`), one row per set in the `sets` table.

mod sets;

pub use sets::SqliteSetStore;

use async_trait::async_trait;
use djsite_common::{NewSet, OrderAssignment, Result, SetPatch, SetRecord};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Structured-record store holding set metadata
///
/// No locking or versioning: concurrent writers overwrite each other.
#[async_trait]
pub trait SetStore: Send + Sync {
    /// All records, ascending by `order`
    async fn list_ordered(&self) -> Result<Vec<SetRecord>>;

    async fn get(&self, id: &str) -> Result<Option<SetRecord>>;

    /// Insert a record; the store assigns the identifier
    async fn create(&self, new_set: NewSet) -> Result<SetRecord>;

    /// Write only the fields present in `patch`
    ///
    /// Fails with `Error::NotFound` for an unknown id.
    async fn update(&self, id: &str, patch: &SetPatch) -> Result<()>;

    /// Remove a record; removing an unknown id is not an error
    async fn delete(&self, id: &str) -> Result<()>;

    /// Apply a reorder batch atomically: all assignments or none
    async fn apply_order(&self, batch: &[OrderAssignment]) -> Result<()>;

    async fn count(&self) -> Result<usize>;
}

/// Open (creating if needed) the site database
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // WAL lets the public catalog read while an admin write is in flight
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    init_tables(&pool).await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// In-memory database with the site schema
///
/// Single connection: every pooled connection to `:memory:` would otherwise
/// see its own empty database.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Create the `sets` table if it does not exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sets (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            duration TEXT NOT NULL DEFAULT '--',
            sort_order INTEGER NOT NULL,
            image_url TEXT NOT NULL DEFAULT '',
            audio_path TEXT,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sets_sort_order ON sets (sort_order)")
        .execute(pool)
        .await?;

    Ok(())
}
