use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{truncate_error, OutboxError, OutboxRecord, OutboxStore, Result};

/// Postgres-backed outbox: id, event_type, payload (json), attempts,
/// created_at, published_at (nullable), last_error (nullable, <= 1000
/// chars).
pub struct PostgresOutboxStore {
    pool: PgPool,
}

impl PostgresOutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS outbox_events (
                id UUID PRIMARY KEY,
                event_type TEXT NOT NULL,
                payload JSONB NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                published_at TIMESTAMPTZ,
                last_error TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| OutboxError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct OutboxRow {
    id: Uuid,
    event_type: String,
    payload: serde_json::Value,
    attempts: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    published_at: Option<chrono::DateTime<chrono::Utc>>,
    last_error: Option<String>,
}

impl From<OutboxRow> for OutboxRecord {
    fn from(row: OutboxRow) -> Self {
        Self {
            id: row.id,
            event_type: row.event_type,
            payload: row.payload,
            attempts: row.attempts,
            created_at: row.created_at,
            published_at: row.published_at,
            last_error: row.last_error,
        }
    }
}

#[async_trait]
impl OutboxStore for PostgresOutboxStore {
    async fn save_pending(&self, event_type: &str, payload: serde_json::Value) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO outbox_events (id, event_type, payload, attempts, created_at)
            VALUES ($1, $2, $3, 0, now())
            "#,
        )
        .bind(id)
        .bind(event_type)
        .bind(&payload)
        .execute(&self.pool)
        .await
        .map_err(|e| OutboxError::Storage(e.to_string()))?;

        Ok(id)
    }

    async fn list_pending(&self, limit: i64) -> Result<Vec<OutboxRecord>> {
        let rows: Vec<OutboxRow> = sqlx::query_as(
            r#"
            SELECT id, event_type, payload, attempts, created_at, published_at, last_error
            FROM outbox_events
            WHERE published_at IS NULL
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| OutboxError::Storage(e.to_string()))?;

        Ok(rows.into_iter().map(OutboxRecord::from).collect())
    }

    async fn mark_published(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"UPDATE outbox_events SET published_at = now(), last_error = NULL WHERE id = $1"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| OutboxError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn mark_failed_attempt(&self, id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            r#"UPDATE outbox_events SET attempts = attempts + 1, last_error = $2 WHERE id = $1"#,
        )
        .bind(id)
        .bind(truncate_error(error))
        .execute(&self.pool)
        .await
        .map_err(|e| OutboxError::Storage(e.to_string()))?;

        Ok(())
    }
}
