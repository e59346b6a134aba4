//! WebSocket consumer endpoint.
//!
//! Every connection is routed by the path after the leading slash
//! (`/843cf35d...`). It publishes raw events and receives the normalized
//! records of every publisher on the same session, itself included.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use packet_relay_core::{ChannelConnection, Connection, Relay};

/// WebSocket handler state.
#[derive(Clone)]
pub struct WsState {
    relay: Relay,
}

impl WsState {
    #[must_use]
    pub const fn new(relay: Relay) -> Self {
        Self { relay }
    }
}

/// Upgrade handler for `/{*session_id}`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<WsState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

/// Handler for `/`, which carries no session id. The upgrade is refused,
/// so no socket is opened.
pub async fn ws_root_handler() -> impl IntoResponse {
    tracing::warn!("Rejected connection without session id");
    (StatusCode::BAD_REQUEST, "Session id is required")
}

async fn handle_socket(socket: WebSocket, session_id: String, state: WsState) {
    let (mut sender, mut receiver) = socket.split();

    let (connection, mut rx) = ChannelConnection::new();
    let connection_id = connection.id();
    let mut lifecycle = state.relay.accept(&session_id, Arc::new(connection));
    if lifecycle.is_closed() {
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    // Spawn task to forward broadcast frames to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender
                .send(Message::Text(frame.as_str().to_owned().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s.into(),
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id,
                        connection_id = %connection_id,
                        "Dropped binary frame with invalid UTF-8: {e}"
                    );
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {e}");
                break;
            }
        };

        // Malformed frames are logged by the lifecycle; the connection stays open.
        let _ = lifecycle.handle_frame(text.as_str());
    }

    lifecycle.close();
    send_task.abort();
}

/// Create the WebSocket router.
///
/// # Example
/// ```ignore
/// let app = Router::new()
///     .merge(create_ws_router(relay));
/// ```
#[must_use]
pub fn create_ws_router(relay: Relay) -> Router {
    Router::new()
        .route("/", get(ws_root_handler))
        .route("/{*session_id}", get(ws_handler))
        .with_state(WsState::new(relay))
}
