use axum::extract::ws::{Message, WebSocket};
use dialog::{DialogChannel, IncomingMessage, OutgoingMessage};
use domain::{Result, ScreeningError};

fn transport_error(e: axum::Error) -> ScreeningError {
    ScreeningError::Transient(format!("websocket transport error: {e}"))
}

/// Drives `DialogEngine` over a live axum `WebSocket`. Text frames carry the
/// JSON-tagged message shapes from `dialog::messages`; anything else
/// (ping/pong, a stray binary frame) is ignored rather than treated as a
/// protocol error.
pub struct WebSocketChannel {
    socket: WebSocket,
}

impl WebSocketChannel {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait::async_trait]
impl DialogChannel for WebSocketChannel {
    async fn send(&mut self, msg: OutgoingMessage) -> Result<()> {
        let text = serde_json::to_string(&msg)
            .map_err(|e| ScreeningError::Fatal(format!("serialize outgoing message: {e}")))?;
        self.socket.send(Message::Text(text.into())).await.map_err(transport_error)
    }

    async fn recv(&mut self) -> Result<Option<IncomingMessage>> {
        loop {
            let Some(frame) = self.socket.recv().await else {
                return Ok(None);
            };
            match frame.map_err(transport_error)? {
                Message::Text(text) => {
                    let parsed = serde_json::from_str(text.as_str()).map_err(|e| {
                        ScreeningError::InvalidEnvelope(format!("malformed client message: {e}"))
                    })?;
                    return Ok(Some(parsed));
                }
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => continue,
            }
        }
    }
}
