mod broker;
mod consumer;
mod memory;
mod reliable;

pub use broker::BrokerPublisher;
pub use consumer::BrokerConsumer;
pub use memory::InMemoryPublisher;
pub use reliable::ReliablePublisher;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{DomainEvent, ScreeningError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A subscriber callback. Returns an error to signal failed processing;
/// the publisher logs it and, for in-process dispatch, keeps fanning out to
/// the remaining handlers.
pub type EventHandler =
    Arc<dyn Fn(DomainEvent) -> BoxFuture<'static, Result<(), ScreeningError>> + Send + Sync>;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), ScreeningError>;
    fn subscribe(&self, handler: EventHandler);
}

pub const QUEUE_NAME: &str = "screening.events";
