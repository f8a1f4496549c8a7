//! WebSocket client session management.

use std::sync::Arc;

use atrium_server::infrastructure::dto::websocket::{ClientSignal, ServerEvent};
use atrium_shared::time::now_millis;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        self, Message,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode, header::AUTHORIZATION},
    },
};

use crate::{
    api::ApiClient,
    command::{Command, HELP},
    error::ClientError,
    formatter::MessageFormatter,
    reconcile::ClientState,
    ui::print_above_prompt,
};

/// Run one WebSocket session until the user quits or the transport is lost.
///
/// `Ok(())` means the user asked to leave; any error is a candidate for a
/// reconnect.
pub async fn run_client_session(
    ws_url: &str,
    token: &str,
    api: &ApiClient,
    state: Arc<Mutex<ClientState>>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let mut request = ws_url
        .into_client_request()
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    let authorization = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ClientError::AuthenticationFailed(e.to_string()))?;
    request.headers_mut().insert(AUTHORIZATION, authorization);

    let (ws_stream, _response) = connect_async(request).await.map_err(connect_error)?;
    tracing::info!("Connected to {}", ws_url);

    // Presence and typing are rebuilt from this session's events.
    state.lock().await.begin_reconnect();

    match api.recent_messages(None).await {
        Ok(history) => {
            let merged = state.lock().await.merge_history(history);
            tracing::debug!("Merged {} messages from history", merged);
        }
        Err(ClientError::AuthenticationFailed(reason)) => {
            return Err(ClientError::AuthenticationFailed(reason));
        }
        Err(e) => tracing::warn!("Failed to fetch message history: {}", e),
    }

    let (mut write, mut read) = ws_stream.split();

    let read_state = state.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let output = match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            let mut state = read_state.lock().await;
                            render_event(&mut state, &event, now_millis())
                        }
                        Err(_) => Some(MessageFormatter::format_raw_message(&text)),
                    };
                    if let Some(output) = output {
                        print_above_prompt(&output);
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    let write_loop = async {
        while let Some(line) = input_rx.recv().await {
            let command = match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => command,
                Err(e) => {
                    print_above_prompt(&MessageFormatter::format_error(&e));
                    continue;
                }
            };

            let signal = match execute_command(command, api, &state).await {
                Ok(signal) => signal,
                Err(e @ ClientError::AuthenticationFailed(_)) => return Err(e),
                Err(e) => {
                    print_above_prompt(&MessageFormatter::format_error(&e));
                    continue;
                }
            };

            if let Some(signal) = signal {
                let payload = serde_json::to_string(&signal)
                    .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
                write
                    .send(Message::Text(payload.into()))
                    .await
                    .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
            }
        }

        write.send(Message::Close(None)).await.ok();
        Ok::<(), ClientError>(())
    };
    tokio::pin!(write_loop);

    let result = tokio::select! {
        _ = &mut read_task => {
            Err(ClientError::ConnectionError("connection closed".to_string()))
        }
        result = &mut write_loop => result,
    };
    read_task.abort();
    result
}

fn connect_error(error: tungstenite::Error) -> ClientError {
    match error {
        tungstenite::Error::Http(response) if response.status() == StatusCode::UNAUTHORIZED => {
            ClientError::AuthenticationFailed(format!("server returned {}", response.status()))
        }
        other => ClientError::ConnectionError(other.to_string()),
    }
}

/// Apply an event to the local state and return what should be printed.
pub(crate) fn render_event(state: &mut ClientState, event: &ServerEvent, now: i64) -> Option<String> {
    match event {
        ServerEvent::SessionReady { user, online, .. } => {
            state.apply(event);
            Some(MessageFormatter::format_session_ready(user, online))
        }
        ServerEvent::MessageCreated { message } => {
            let is_new = !state.messages().contains(message.id);
            state.apply(event);
            (is_new && state.messages().contains(message.id))
                .then(|| MessageFormatter::format_message_created(message))
        }
        ServerEvent::MessageUpdated { message } => state
            .apply(event)
            .then(|| MessageFormatter::format_message_updated(message)),
        ServerEvent::MessageDeleted { message } => state
            .apply(event)
            .then(|| MessageFormatter::format_message_deleted(message)),
        ServerEvent::PresenceOnline {
            user_id,
            display_name,
            at,
        } => (state.apply(event) && !state.is_me(*user_id))
            .then(|| MessageFormatter::format_presence_online(display_name, *at)),
        ServerEvent::PresenceOffline {
            display_name, at, ..
        } => state
            .apply(event)
            .then(|| MessageFormatter::format_presence_offline(display_name, *at)),
        ServerEvent::TypingChanged { .. } => {
            if !state.apply(event) {
                return None;
            }
            MessageFormatter::format_typing(&state.active_typing(now))
        }
        ServerEvent::PrivateMessage {
            from_display_name,
            body,
            sent_at,
            ..
        } => Some(MessageFormatter::format_private_message(
            from_display_name,
            body,
            *sent_at,
        )),
        ServerEvent::Ack {
            client_ref,
            received_at,
        } => Some(MessageFormatter::format_ack(client_ref.as_deref(), *received_at)),
    }
}

/// Run a parsed command. Returns the signal to send over the socket, if any.
async fn execute_command(
    command: Command,
    api: &ApiClient,
    state: &Mutex<ClientState>,
) -> Result<Option<ClientSignal>, ClientError> {
    match command {
        Command::Post(content) => {
            let message = api.post_message(content).await?;
            Ok(Some(ClientSignal::SendMessage {
                client_ref: Some(format!("message-{}", message.id)),
            }))
        }
        Command::TypingStart => Ok(Some(ClientSignal::TypingStart)),
        Command::TypingStop => Ok(Some(ClientSignal::TypingStop)),
        Command::Private {
            target_user_id,
            body,
        } => {
            print_above_prompt(&format!("[private -> #{}] {}\n", target_user_id, body));
            Ok(Some(ClientSignal::PrivateMessage {
                target_user_id,
                body,
            }))
        }
        Command::Edit { id, content } => {
            api.edit_message(id, content).await?;
            Ok(None)
        }
        Command::Delete { id } => {
            api.delete_message(id).await?;
            Ok(None)
        }
        Command::Who => {
            let state = state.lock().await;
            let me = state.me().map(|me| me.user_id);
            print_above_prompt(&MessageFormatter::format_roster(state.roster(), me));
            Ok(None)
        }
        Command::History => {
            let state = state.lock().await;
            print_above_prompt(&MessageFormatter::format_history(state.messages()));
            Ok(None)
        }
        Command::Help | Command::Quit => {
            print_above_prompt(HELP);
            Ok(None)
        }
    }
}
