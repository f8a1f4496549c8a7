//! Atrium terminal client with reconnection support.
//!
//! Connects to the real-time endpoint with a bearer token, prints messages,
//! presence and typing changes, and posts typed lines through the HTTP API.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second
//! interval) and exits immediately when the token is rejected.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin atrium-client -- --token alice-token
//! ATRIUM_TOKEN=bob-token cargo run --bin atrium-client
//! ```

use std::time::Duration;

use clap::Parser;

use atrium_client::{ClientOptions, run_client};
use atrium_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "atrium-client")]
#[command(about = "Terminal client for the Atrium presence and message broadcast core", long_about = None)]
struct Args {
    /// Bearer token presented at connection time
    #[arg(short = 't', long, env = "ATRIUM_TOKEN")]
    token: String,

    /// WebSocket endpoint
    #[arg(short = 'u', long, env = "ATRIUM_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// HTTP API base URL
    #[arg(long, env = "ATRIUM_API_URL", default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// Seconds after which a typing indicator without a stop is hidden
    #[arg(long, env = "ATRIUM_TYPING_WINDOW_SECS", default_value_t = 6)]
    typing_window_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let options = ClientOptions {
        ws_url: args.url,
        api_url: args.api_url,
        token: args.token,
        typing_window: Duration::from_secs(args.typing_window_secs),
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
