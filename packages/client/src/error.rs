//! Error types for the Atrium terminal client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the bearer token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// WebSocket transport could not be opened or was lost
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// HTTP API call failed
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Http(error.to_string())
    }
}
