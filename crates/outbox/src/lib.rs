mod memory;
mod postgres;

pub use memory::InMemoryOutboxStore;
pub use postgres::PostgresOutboxStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One row of the durable outbox table. `published_at.is_none()` is pending.
#[derive(Debug, Clone)]
pub struct OutboxRecord {
    pub id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl OutboxRecord {
    pub fn is_pending(&self) -> bool {
        self.published_at.is_none()
    }
}

const LAST_ERROR_MAX_LEN: usize = 1000;

fn truncate_error(error: &str) -> String {
    if error.len() <= LAST_ERROR_MAX_LEN {
        error.to_string()
    } else {
        error.chars().take(LAST_ERROR_MAX_LEN).collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("outbox storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, OutboxError>;

/// Durable pending/published bookkeeping for at-least-once event delivery.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    async fn save_pending(&self, event_type: &str, payload: serde_json::Value) -> Result<Uuid>;
    async fn list_pending(&self, limit: i64) -> Result<Vec<OutboxRecord>>;
    async fn mark_published(&self, id: Uuid) -> Result<()>;
    async fn mark_failed_attempt(&self, id: Uuid, error: &str) -> Result<()>;
}
