//! Atrium real-time server.
//!
//! Authenticates WebSocket connections, tracks presence and fans out chat
//! events. Message commands are served over HTTP under `/api/messages`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin atrium-server -- --tokens-file tokens.json
//! cargo run --bin atrium-server -- --auth-url http://127.0.0.1:5000/api/auth/verify --port 3000
//! ```

use std::{path::PathBuf, sync::Arc};

use atrium_server::{
    config::{
        DEFAULT_RECENT_CACHE_TTL_SECS, DEFAULT_RECENT_LIMIT, DEFAULT_SESSION_TTL_SECS,
        DEFAULT_TYPING_TIMEOUT_SECS, ServerConfig,
    },
    domain::CredentialVerifier,
    infrastructure::{
        auth::{CachedCredentialVerifier, HttpCredentialVerifier, StaticTokenVerifier},
        cache::InMemoryCacheTier,
    },
    ui::{AppState, Server},
};
use atrium_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "atrium-server")]
#[command(about = "Real-time presence and message broadcast server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ATRIUM_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ATRIUM_PORT", default_value = "8080")]
    port: u16,

    /// JSON file with static credentials (`[{"token", "userId", "username", "isAdmin", "isActive"}]`)
    #[arg(long, env = "ATRIUM_TOKENS_FILE", conflicts_with = "auth_url", required_unless_present = "auth_url")]
    tokens_file: Option<PathBuf>,

    /// Remote credential verification endpoint
    #[arg(long, env = "ATRIUM_AUTH_URL")]
    auth_url: Option<String>,

    /// Lifetime of a cached session, in seconds
    #[arg(long, env = "ATRIUM_SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL_SECS)]
    session_ttl_secs: u64,

    /// Lifetime of the cached recent-message list, in seconds
    #[arg(long, env = "ATRIUM_RECENT_CACHE_TTL_SECS", default_value_t = DEFAULT_RECENT_CACHE_TTL_SECS)]
    recent_cache_ttl_secs: u64,

    /// Number of recent messages kept in the cache
    #[arg(long, env = "ATRIUM_RECENT_LIMIT", default_value_t = DEFAULT_RECENT_LIMIT)]
    recent_limit: usize,

    /// Server-side typing expiry in seconds (0 disables)
    #[arg(long, env = "ATRIUM_TYPING_TIMEOUT_SECS", default_value_t = DEFAULT_TYPING_TIMEOUT_SECS)]
    typing_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ServerConfig::from_secs(
        args.session_ttl_secs,
        args.recent_cache_ttl_secs,
        args.recent_limit,
        args.typing_timeout_secs,
    );

    // Initialize dependencies in order:
    // 1. Shared cache tier
    // 2. Credential verifier (wrapped with the session cache)
    // 3. AppState (registry, pusher, store, use cases)
    // 4. Server

    // 1. Shared cache tier
    let cache = Arc::new(InMemoryCacheTier::new());

    // 2. Credential verifier
    let upstream: Arc<dyn CredentialVerifier> = match (&args.tokens_file, &args.auth_url) {
        (Some(path), _) => match StaticTokenVerifier::from_json_file(path) {
            Ok(verifier) => {
                tracing::info!("Loaded {} static credential(s) from {}", verifier.len(), path.display());
                Arc::new(verifier)
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        (None, Some(url)) => {
            tracing::info!("Verifying credentials against {}", url);
            Arc::new(HttpCredentialVerifier::new(url.clone()))
        }
        (None, None) => {
            tracing::error!("Either --tokens-file or --auth-url is required");
            std::process::exit(2);
        }
    };
    let verifier = Arc::new(CachedCredentialVerifier::new(
        upstream,
        cache.clone(),
        config.session_ttl,
    ));

    // 3. AppState
    let state = Arc::new(AppState::in_memory(
        verifier,
        cache.clone(),
        Arc::new(SystemClock),
        &config,
    ));

    // 4. Create and run the server
    let server = Server::new(state)
        .with_typing_timeout(config.typing_timeout)
        .with_cache_purge(cache);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
