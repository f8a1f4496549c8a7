//! Client execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{Mutex, mpsc};

use crate::{
    api::ApiClient,
    domain::{should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    reconcile::ClientState,
    session::run_client_session,
    ui::PROMPT,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Connection settings for the terminal client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub ws_url: String,
    /// HTTP base, e.g. `http://127.0.0.1:8080`
    pub api_url: String,
    pub token: String,
    /// Local inactivity cutoff for typing indicators
    pub typing_window: Duration,
}

/// Run the WebSocket client with reconnection logic
pub async fn run_client(options: ClientOptions) -> Result<(), ClientError> {
    let api = ApiClient::new(options.api_url.clone(), options.token.clone());
    let typing_window_millis = i64::try_from(options.typing_window.as_millis()).unwrap_or(i64::MAX);
    let state = Arc::new(Mutex::new(ClientState::new(typing_window_millis)));

    // One readline thread outlives every reconnect.
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    spawn_readline(input_tx);

    println!("\nType a message and press Enter to post it. /help lists commands.\n");

    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            options.ws_url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(
            &options.ws_url,
            &options.token,
            &api,
            state.clone(),
            &mut input_rx,
        )
        .await
        {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    tracing::error!("{}. Check the token and sign in again.", e);
                    return Err(e);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

/// Read lines on a blocking thread and forward them to the async side.
///
/// The sender is dropped on Ctrl+C or Ctrl+D, which ends the session normally.
fn spawn_readline(input_tx: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });
}
