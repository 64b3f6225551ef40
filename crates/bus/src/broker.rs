use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain::{DomainEvent, ScreeningError};
use lapin::options::{
    BasicPublishOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection, ConnectionProperties};

use crate::{BrokerConsumer, EventHandler, EventPublisher, QUEUE_NAME};

/// Publishes domain events onto a durable AMQP queue. Mirrors the original
/// RabbitMQ publisher: one queue, persistent delivery mode, connection
/// re-established per publish since the broker may bounce between calls.
pub struct BrokerPublisher {
    amqp_url: String,
    queue: String,
    handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl BrokerPublisher {
    pub fn new(amqp_url: impl Into<String>) -> Self {
        Self {
            amqp_url: amqp_url.into(),
            queue: QUEUE_NAME.to_string(),
            handlers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A consumer bound to the same queue and the same in-process handler
    /// registry as this publisher.
    pub fn consumer(&self) -> BrokerConsumer {
        BrokerConsumer::new(self.amqp_url.clone(), self.queue.clone(), self.handlers.clone())
    }

    async fn connect(&self) -> Result<Connection, ScreeningError> {
        Connection::connect(&self.amqp_url, ConnectionProperties::default())
            .await
            .map_err(|e| ScreeningError::BrokerUnavailable(e.to_string()))
    }
}

#[async_trait]
impl EventPublisher for BrokerPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), ScreeningError> {
        let body = domain::envelope::encode(&event)?;

        let conn = self.connect().await?;
        let channel = conn
            .create_channel()
            .await
            .map_err(|e| ScreeningError::BrokerUnavailable(e.to_string()))?;

        channel
            .queue_declare(&self.queue, QueueDeclareOptions { durable: true, ..Default::default() }, FieldTable::default())
            .await
            .map_err(|e| ScreeningError::BrokerUnavailable(e.to_string()))?;

        channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                body.as_bytes(),
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|e| ScreeningError::BrokerUnavailable(e.to_string()))?
            .await
            .map_err(|e| ScreeningError::BrokerUnavailable(e.to_string()))?;

        Ok(())
    }

    fn subscribe(&self, handler: EventHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(handler);
    }
}
