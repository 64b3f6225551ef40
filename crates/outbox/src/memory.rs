use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{truncate_error, OutboxError, OutboxRecord, OutboxStore, Result};

/// In-process outbox used by tests and by the in-memory composition root.
#[derive(Default)]
pub struct InMemoryOutboxStore {
    rows: Mutex<BTreeMap<Uuid, OutboxRecord>>,
}

impl InMemoryOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn save_pending(&self, event_type: &str, payload: serde_json::Value) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let record = OutboxRecord {
            id,
            event_type: event_type.to_string(),
            payload,
            attempts: 0,
            created_at: Utc::now(),
            published_at: None,
            last_error: None,
        };
        self.rows
            .lock()
            .map_err(|_| OutboxError::Storage("outbox mutex poisoned".into()))?
            .insert(id, record);
        Ok(id)
    }

    async fn list_pending(&self, limit: i64) -> Result<Vec<OutboxRecord>> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| OutboxError::Storage("outbox mutex poisoned".into()))?;
        let mut pending: Vec<OutboxRecord> = rows
            .values()
            .filter(|r| r.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending.truncate(limit.max(0) as usize);
        Ok(pending)
    }

    async fn mark_published(&self, id: Uuid) -> Result<()> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| OutboxError::Storage("outbox mutex poisoned".into()))?;
        if let Some(row) = rows.get_mut(&id) {
            row.published_at = Some(Utc::now());
            row.last_error = None;
        }
        Ok(())
    }

    async fn mark_failed_attempt(&self, id: Uuid, error: &str) -> Result<()> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| OutboxError::Storage("outbox mutex poisoned".into()))?;
        if let Some(row) = rows.get_mut(&id) {
            row.attempts += 1;
            row.last_error = Some(truncate_error(error));
        }
        Ok(())
    }
}
