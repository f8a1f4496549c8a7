//! WebSocket connection handlers.

use std::sync::Arc;

use atrium_shared::time::Clock;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{Connection, Identity},
    infrastructure::dto::websocket::{ClientSignal, ServerEvent},
    ui::{auth::AuthenticatedUser, state::AppState},
};

/// `GET /ws`: authenticate, then upgrade.
///
/// Authentication runs in the extractor, so a rejected token answers 401
/// before the upgrade and no Connection is ever created.
pub async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    tracing::info!("User {} ({}) authenticated", identity.user_id, identity.display_name);
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Spawns a task that forwards frames from the connection's outbound channel
/// to the WebSocket sink.
///
/// The channel closes when the connection is unregistered (eviction); the
/// loop then sends a close frame so the client sees the disconnect.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    let connection = state
        .connect_participant_usecase
        .execute(&identity, tx)
        .await;

    let state_clone = state.clone();
    let connection_clone = connection.clone();

    // Spawn a task to receive signals from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on {}: {}", connection_clone.id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientSignal>(&text) {
                    Ok(signal) => handle_signal(&state_clone, &connection_clone, signal).await,
                    Err(e) => {
                        tracing::warn!("Ignoring malformed signal from {}: {}", connection_clone.id, e);
                    }
                },
                Message::Ping(_) => {
                    tracing::trace!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection_clone.id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Always attempt cleanup; a forced eviction may already have removed it.
    state
        .disconnect_participant_usecase
        .execute(&connection.id)
        .await;
}

async fn handle_signal(state: &AppState, connection: &Connection, signal: ClientSignal) {
    match signal {
        ClientSignal::SendMessage { client_ref } => {
            let ack = ServerEvent::Ack {
                client_ref,
                received_at: state.clock.now_millis(),
            };
            if let Err(e) = state.broadcast_router.reply(&connection.id, &ack).await {
                tracing::warn!("Failed to acknowledge {}: {}", connection.id, e);
            }
        }
        ClientSignal::TypingStart => state.typing_usecase.start(connection).await,
        ClientSignal::TypingStop => state.typing_usecase.stop(connection).await,
        ClientSignal::PrivateMessage {
            target_user_id,
            body,
        } => {
            if let Err(e) = state
                .private_message_usecase
                .execute(connection, target_user_id, body)
                .await
            {
                tracing::warn!("Rejected private message from {}: {}", connection.id, e);
            }
        }
    }
}
