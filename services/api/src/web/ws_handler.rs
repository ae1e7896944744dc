//! services/api/src/web/ws_handler.rs
//!
//! Streams generation events to a connected browser. The socket is
//! server-to-client only: anything the client sends apart from a close frame
//! is ignored.

use crate::web::{protocol::ServerMessage, state::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Serializes and sends one message. Returns `false` once the socket is gone.
async fn send_message<S>(sender: &mut S, message: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return true;
        }
    };
    sender.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");
    let (sender, receiver) = socket.split();
    stream_events(&app_state, sender, receiver).await;
    info!("WebSocket connection closed.");
}

/// Sends the snapshot, then relays events until the client side goes away.
async fn stream_events<S, R>(app_state: &AppState, mut sender: S, mut receiver: R)
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    // Subscribe before taking the snapshot so no event falls in between.
    let mut events = app_state.subscribe();

    let snapshot = {
        let studio = app_state.studio.lock().await;
        ServerMessage::Snapshot {
            is_generating: studio.is_generating(),
            progress: studio.progress(),
        }
    };
    if !send_message(&mut sender, &snapshot).await {
        error!("Failed to send the initial snapshot.");
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(message) => {
                    if !send_message(&mut sender, &message).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket subscriber lagged behind by {} events.", skipped);
                    let notice = ServerMessage::Error {
                        message: format!("Missed {} events; refresh the results.", skipped),
                    };
                    if !send_message(&mut sender, &notice).await {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}
