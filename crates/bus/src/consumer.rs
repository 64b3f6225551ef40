use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Connection, ConnectionProperties};

use crate::{BoxFuture, EventHandler};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type BootstrapDrain = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Drains `screening.events` and dispatches each delivery to every
/// subscribed handler. Acks only if every handler succeeds; a single
/// handler failure nacks with requeue so the broker redelivers it.
pub struct BrokerConsumer {
    amqp_url: String,
    queue: String,
    handlers: Arc<Mutex<Vec<EventHandler>>>,
    bootstrap_drain: Option<BootstrapDrain>,
}

impl BrokerConsumer {
    pub fn new(amqp_url: String, queue: String, handlers: Arc<Mutex<Vec<EventHandler>>>) -> Self {
        Self { amqp_url, queue, handlers, bootstrap_drain: None }
    }

    /// Registers a reliable-outbox drain to run once a connection is
    /// established, before the receive loop starts — so rows accumulated
    /// while the broker was down are flushed as soon as this consumer
    /// reconnects.
    pub fn with_bootstrap_drain(mut self, drain: BootstrapDrain) -> Self {
        self.bootstrap_drain = Some(drain);
        self
    }

    /// Runs until the process is shut down, reconnecting on broker errors.
    pub async fn run(&self) {
        loop {
            if let Err(err) = self.run_once().await {
                tracing::warn!(error = %err, "broker_consumer_disconnected");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }

    async fn run_once(&self) -> Result<(), lapin::Error> {
        let conn = Connection::connect(&self.amqp_url, ConnectionProperties::default()).await?;
        let channel = conn.create_channel().await?;

        channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions { durable: true, ..Default::default() },
                FieldTable::default(),
            )
            .await?;

        channel
            .basic_qos(1, BasicQosOptions::default())
            .await?;

        if let Some(drain) = &self.bootstrap_drain {
            drain().await;
        }

        let mut consumer = channel
            .basic_consume(
                &self.queue,
                "screening-consumer",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        tracing::info!(queue = %self.queue, "broker_consumer_started");

        while let Some(delivery) = consumer.next().await {
            let delivery = delivery?;
            let body = String::from_utf8_lossy(&delivery.data).into_owned();

            let ok = match domain::envelope::decode(&body) {
                Ok(event) => self.dispatch(event).await,
                Err(err) => {
                    tracing::error!(error = %err, "broker_consumer_bad_envelope");
                    false
                }
            };

            if ok {
                delivery.ack(BasicAckOptions::default()).await?;
            } else {
                delivery
                    .nack(BasicNackOptions { requeue: true, ..Default::default() })
                    .await?;
            }
        }

        Ok(())
    }

    async fn dispatch(&self, event: domain::DomainEvent) -> bool {
        let handlers = {
            let guard = self
                .handlers
                .lock()
                .unwrap_or_else(|poison| poison.into_inner());
            guard.clone()
        };

        let mut all_ok = true;
        for handler in handlers {
            if let Err(err) = handler(event.clone()).await {
                tracing::warn!(error = %err, event_type = event.event_type(), "event_handler_failed");
                all_ok = false;
            }
        }
        all_ok
    }
}
