use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{DomainEvent, ScreeningError};
use outbox::OutboxStore;
use tokio::sync::Mutex as AsyncMutex;

use crate::{EventHandler, EventPublisher};

const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(200);
const DRAIN_BATCH: i64 = 100;

/// Wraps a delegate publisher with an outbox so a publish always durably
/// records intent before attempting delivery. If the delegate fails, the
/// event stays pending and a background relay retries it on a timer; a
/// successful direct publish also takes an opportunistic drain pass so the
/// backlog doesn't linger once the broker recovers.
pub struct ReliablePublisher {
    delegate: Arc<dyn EventPublisher>,
    outbox: Arc<dyn OutboxStore>,
    flush_interval: Duration,
    drain_lock: AsyncMutex<()>,
}

impl ReliablePublisher {
    pub fn new(
        delegate: Arc<dyn EventPublisher>,
        outbox: Arc<dyn OutboxStore>,
        flush_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            delegate,
            outbox,
            flush_interval: flush_interval.max(MIN_FLUSH_INTERVAL),
            drain_lock: AsyncMutex::new(()),
        })
    }

    /// Spawns the periodic relay that re-attempts pending outbox rows.
    pub fn spawn_relay(self: &Arc<Self>) {
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(this.flush_interval).await;
                this.drain_once(DRAIN_BATCH).await;
            }
        });
    }

    /// Publishes every pending outbox row in order, stopping at the first
    /// failure so a down broker doesn't spin the loop hot. Skips entirely
    /// if another drain is already in progress.
    pub async fn drain_once(&self, limit: i64) {
        let Ok(_guard) = self.drain_lock.try_lock() else {
            return;
        };

        let pending = match self.outbox.list_pending(limit).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, "outbox_list_pending_failed");
                return;
            }
        };

        for row in pending {
            let event = match domain::envelope::decode(&row.payload.to_string()) {
                Ok(event) => event,
                Err(err) => {
                    tracing::error!(error = %err, outbox_id = %row.id, "outbox_row_undecodable");
                    continue;
                }
            };

            match self.delegate.publish(event).await {
                Ok(()) => {
                    if let Err(err) = self.outbox.mark_published(row.id).await {
                        tracing::warn!(error = %err, outbox_id = %row.id, "outbox_mark_published_failed");
                    }
                }
                Err(err) => {
                    if let Err(mark_err) =
                        self.outbox.mark_failed_attempt(row.id, &err.to_string()).await
                    {
                        tracing::warn!(error = %mark_err, outbox_id = %row.id, "outbox_mark_failed_attempt_failed");
                    }
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl EventPublisher for ReliablePublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), ScreeningError> {
        let payload = serde_json::to_value(&event)
            .map_err(|e| ScreeningError::InvalidEnvelope(e.to_string()))?;
        let id = self
            .outbox
            .save_pending(event.event_type(), payload)
            .await
            .map_err(|e| ScreeningError::Fatal(e.to_string()))?;

        match self.delegate.publish(event).await {
            Ok(()) => {
                self.outbox
                    .mark_published(id)
                    .await
                    .map_err(|e| ScreeningError::Fatal(e.to_string()))?;
                self.drain_once(DRAIN_BATCH).await;
                Ok(())
            }
            Err(err) => {
                self.outbox
                    .mark_failed_attempt(id, &err.to_string())
                    .await
                    .map_err(|e| ScreeningError::Fatal(e.to_string()))?;
                Err(err)
            }
        }
    }

    fn subscribe(&self, handler: EventHandler) {
        self.delegate.subscribe(handler);
    }
}
