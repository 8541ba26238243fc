//! SQLite-backed set store

use async_trait::async_trait;
use djsite_common::{Error, NewSet, OrderAssignment, Result, SetPatch, SetRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::SetStore;

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, duration, sort_order, image_url, audio_path, created_at FROM sets";

/// `SetStore` over the `sets` table
#[derive(Clone)]
pub struct SqliteSetStore {
    pool: SqlitePool,
}

impl SqliteSetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &SqliteRow) -> SetRecord {
    SetRecord {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        duration: row.get("duration"),
        order: row.get("sort_order"),
        image_url: row.get("image_url"),
        audio_path: row.get("audio_path"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl SetStore for SqliteSetStore {
    async fn list_ordered(&self) -> Result<Vec<SetRecord>> {
        // Ties on sort_order fall back to creation time, then id
        let sql = format!("{} ORDER BY sort_order ASC, created_at ASC, id ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<SetRecord>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn create(&self, new_set: NewSet) -> Result<SetRecord> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO sets (id, title, description, duration, sort_order, image_url, audio_path, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new_set.title)
        .bind(&new_set.description)
        .bind(&new_set.duration)
        .bind(new_set.order)
        .bind(&new_set.image_url)
        .bind(&new_set.audio_path)
        .bind(new_set.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(set_id = %id, order = new_set.order, "Set record created");

        Ok(new_set.into_record(id))
    }

    async fn update(&self, id: &str, patch: &SetPatch) -> Result<()> {
        // Absent fields bind NULL and COALESCE keeps the stored value
        let result = sqlx::query(
            r#"
            UPDATE sets SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                duration = COALESCE(?, duration),
                sort_order = COALESCE(?, sort_order),
                image_url = COALESCE(?, image_url),
                audio_path = COALESCE(?, audio_path)
            WHERE id = ?
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.duration)
        .bind(patch.order)
        .bind(&patch.image_url)
        .bind(&patch.audio_path)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Set not found: {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn apply_order(&self, batch: &[OrderAssignment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for assignment in batch {
            let result = sqlx::query("UPDATE sets SET sort_order = ? WHERE id = ?")
                .bind(assignment.order)
                .bind(&assignment.id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                // Dropping tx rolls back the partial batch
                return Err(Error::NotFound(format!("Set not found: {}", assignment.id)));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
