use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use context::AppContext;
use dialog::{DialogEngine, EmmaInterviewer};
use domain::ApplicationId;
use serde::Deserialize;

use crate::ws_channel::WebSocketChannel;

const CLOSE_INVALID_APPLICATION_ID: u16 = 4000;
const CLOSE_DUPLICATE_ACTIVE_CALL: u16 = 4409;

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub application_id: String,
}

/// Upgrades to a WebSocket and drives one interview session. The close
/// codes (4000 invalid id, 4409 duplicate active call) happen before the
/// upgrade callback does anything else, so the client sees them as the
/// close frame on the handshake response.
pub async fn stream(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<StreamQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let Ok(application_id) = query.application_id.parse::<ApplicationId>() else {
        return ws.on_upgrade(|socket| close_immediately(socket, CLOSE_INVALID_APPLICATION_ID, "invalid application_id"));
    };

    match ctx.calls.is_application_in_call(application_id) {
        Ok(true) => {
            return ws.on_upgrade(|socket| close_immediately(socket, CLOSE_DUPLICATE_ACTIVE_CALL, "duplicate active call"));
        }
        Ok(false) => {}
        Err(_) => {
            return ws.on_upgrade(|socket| close_immediately(socket, 1011, "internal error"));
        }
    }

    ws.on_upgrade(move |socket| run_interview(ctx, application_id, socket))
}

async fn close_immediately(mut socket: WebSocket, code: u16, reason: &'static str) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame { code, reason: reason.into() })))
        .await;
}

async fn run_interview(ctx: Arc<AppContext>, application_id: ApplicationId, socket: WebSocket) {
    let call_id = match ctx.calls.start_call(application_id).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, %application_id, "failed_to_start_call");
            return;
        }
    };

    let prompt = ctx.calls.get_prompt_for_application(application_id).await;
    let interviewer = EmmaInterviewer::new(Some(ctx.chat_model.clone()));
    let mut channel = WebSocketChannel::new(socket);

    let engine = DialogEngine::new(&mut channel, &interviewer, ctx.transcriber.as_ref(), ctx.dialog_config);
    let transcript = match engine.run(&prompt).await {
        Ok(transcript) => transcript,
        Err(e) => {
            tracing::error!(error = %e, %application_id, %call_id, "dialog_engine_failed");
            Vec::new()
        }
    };

    if let Err(e) = ctx.calls.end_call(application_id, call_id, transcript).await {
        tracing::error!(error = %e, %application_id, %call_id, "failed_to_end_call");
    }
}
