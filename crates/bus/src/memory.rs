use std::sync::Mutex;

use async_trait::async_trait;
use domain::{DomainEvent, ScreeningError};

use crate::{EventHandler, EventPublisher};

/// Synchronous fan-out to subscribed handlers. A handler's failure is
/// logged and does not stop the remaining handlers from running.
#[derive(Default)]
pub struct InMemoryPublisher {
    handlers: Mutex<Vec<EventHandler>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), ScreeningError> {
        let handlers = {
            let guard = self
                .handlers
                .lock()
                .unwrap_or_else(|poison| poison.into_inner());
            guard.clone()
        };

        for handler in handlers {
            if let Err(err) = handler(event.clone()).await {
                tracing::warn!(error = %err, event_type = event.event_type(), "event_handler_failed");
            }
        }

        Ok(())
    }

    fn subscribe(&self, handler: EventHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(handler);
    }
}
