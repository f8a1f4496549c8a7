//! Runtime configuration of the real-time core.

use std::time::Duration;

pub const DEFAULT_SESSION_TTL_SECS: u64 = 60;
pub const DEFAULT_RECENT_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_RECENT_LIMIT: usize = 50;
pub const DEFAULT_TYPING_TIMEOUT_SECS: u64 = 6;

/// Tunables shared by the use cases and the server loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Lifetime of a cached session blob
    pub session_ttl: Duration,
    /// Lifetime of the cached recent-message list
    pub recent_cache_ttl: Duration,
    /// Number of messages kept in the recent-message cache (and the max page size)
    pub recent_limit: usize,
    /// Server-side typing expiry; `None` leaves expiry to clients
    pub typing_timeout: Option<Duration>,
}

impl ServerConfig {
    /// Build from the raw CLI values; a zero typing timeout disables the sweeper.
    pub fn from_secs(
        session_ttl_secs: u64,
        recent_cache_ttl_secs: u64,
        recent_limit: usize,
        typing_timeout_secs: u64,
    ) -> Self {
        Self {
            session_ttl: Duration::from_secs(session_ttl_secs),
            recent_cache_ttl: Duration::from_secs(recent_cache_ttl_secs),
            recent_limit: recent_limit.max(1),
            typing_timeout: (typing_timeout_secs > 0)
                .then(|| Duration::from_secs(typing_timeout_secs)),
        }
    }

    /// Inactivity window of the typing state machine, in milliseconds
    pub fn typing_window_millis(&self) -> i64 {
        self.typing_timeout
            .map(|timeout| i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(crate::domain::typing::DEFAULT_TYPING_WINDOW_MILLIS)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_secs(
            DEFAULT_SESSION_TTL_SECS,
            DEFAULT_RECENT_CACHE_TTL_SECS,
            DEFAULT_RECENT_LIMIT,
            DEFAULT_TYPING_TIMEOUT_SECS,
        )
    }
}
