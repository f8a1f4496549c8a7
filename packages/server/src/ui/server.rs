//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{delete, get, put},
};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::infrastructure::cache::InMemoryCacheTier;

use super::{
    handler::{
        create_message, delete_message, evict_user_connections, get_presence, health_check,
        list_messages, update_message, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// How often the typing sweeper looks for expired states
pub const TYPING_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
/// How often expired entries are dropped from the in-process cache
pub const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(30);

/// Real-time presence and broadcast server
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::in_memory(verifier, cache.clone(), clock, &config));
/// Server::new(state)
///     .with_typing_timeout(config.typing_timeout)
///     .with_cache_purge(cache)
///     .run("127.0.0.1".to_string(), 8080)
///     .await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// Server-side typing expiry (`None` leaves expiry to clients)
    typing_timeout: Option<Duration>,
    /// In-process cache to purge periodically
    purge_cache: Option<Arc<InMemoryCacheTier>>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            typing_timeout: None,
            purge_cache: None,
        }
    }

    pub fn with_typing_timeout(mut self, typing_timeout: Option<Duration>) -> Self {
        self.typing_timeout = typing_timeout;
        self
    }

    pub fn with_cache_purge(mut self, cache: Arc<InMemoryCacheTier>) -> Self {
        self.purge_cache = Some(cache);
        self
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/presence", get(get_presence))
            .route("/api/messages", get(list_messages).post(create_message))
            .route(
                "/api/messages/{id}",
                put(update_message).delete(delete_message),
            )
            .route("/api/users/{id}/connections", delete(evict_user_connections))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on `host:port` until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Atrium server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already-bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let background = self.spawn_background_tasks();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        for task in background {
            task.abort();
        }
        result
    }

    fn spawn_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();

        if let Some(timeout) = self.typing_timeout {
            tracing::info!("Typing states expire after {:?}", timeout);
            let typing = self.state.typing_usecase.clone();
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(TYPING_SWEEP_INTERVAL);
                loop {
                    ticker.tick().await;
                    let expired = typing.sweep().await;
                    if expired > 0 {
                        tracing::debug!("Expired {} typing state(s)", expired);
                    }
                }
            }));
        }

        if let Some(cache) = self.purge_cache.clone() {
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(CACHE_PURGE_INTERVAL);
                loop {
                    ticker.tick().await;
                    let purged = cache.purge_expired().await;
                    if purged > 0 {
                        tracing::debug!("Purged {} expired cache entries", purged);
                    }
                }
            }));
        }

        tasks
    }
}
