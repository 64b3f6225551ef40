use async_trait::async_trait;
use domain::Result;

use crate::messages::{IncomingMessage, OutgoingMessage};

/// The transport seam between the dialog engine and an actual streaming
/// connection. `apps/api` implements this over an axum WebSocket; tests
/// implement it over an in-process channel.
#[async_trait]
pub trait DialogChannel: Send {
    async fn send(&mut self, msg: OutgoingMessage) -> Result<()>;

    /// `Ok(None)` means the client disconnected; timeouts are the caller's
    /// responsibility via `tokio::time::timeout` around this call.
    async fn recv(&mut self) -> Result<Option<IncomingMessage>>;
}
