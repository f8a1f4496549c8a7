//! Logging setup utilities for the Atrium binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The default filter enables both library crates, the binary itself and
/// `tower_http` request traces. `RUST_LOG` overrides it entirely.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "atrium-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use atrium_shared::logger::setup_logger;
///
/// setup_logger("atrium-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, level: &str) -> String {
    format!(
        "atrium_server={level},atrium_client={level},atrium_shared={level},{}={level},tower_http={level}",
        binary_name.replace('-', "_"),
    )
}
