//! Domain error taxonomy.
//!
//! - `AuthenticationError`: the only error class a connecting client ever sees
//! - `DeliveryError`: one target could not receive a payload; logged and absorbed by the router
//! - `RegistryConsistencyError`: admit/evict races; absorbed as no-ops

use thiserror::Error;

use super::value_object::{ConnectionId, MessageId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("user id must be positive (got {0})")]
    InvalidUserId(i64),

    #[error("display name must not be empty")]
    DisplayNameEmpty,

    #[error("display name is too long ({len} > {max} characters)")]
    DisplayNameTooLong { len: usize, max: usize },

    #[error("message content must not be empty")]
    MessageContentEmpty,

    #[error("message content is too long ({len} > {max} characters)")]
    MessageContentTooLong { len: usize, max: usize },

    #[error("invalid room key '{0}'")]
    InvalidRoomKey(String),
}

/// Handshake failure. Terminal for the connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid, expired or revoked token")]
    InvalidToken,

    #[error("user {0} is inactive")]
    InactiveUser(UserId),

    #[error("credential verifier returned a malformed identity: {0}")]
    MalformedIdentity(String),

    #[error("credential verifier unavailable: {0}")]
    VerifierUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("connection '{0}' is not registered with the pusher")]
    ConnectionNotFound(ConnectionId),

    #[error("outbound channel of connection '{0}' is closed")]
    ChannelClosed(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryConsistencyError {
    #[error("connection '{0}' is not registered")]
    NotRegistered(ConnectionId),

    #[error("presence has no entry for user {0}")]
    MissingPresence(UserId),

    #[error("registry and presence disagree about user {user_id} (registry last={registry_last}, presence last={presence_last})")]
    PresenceMismatch {
        user_id: UserId,
        registry_last: bool,
        presence_last: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message {0} not found")]
    NotFound(MessageId),

    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

/// Shared cache tier failure. Never fatal: callers fall back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cached value for '{key}' could not be decoded: {reason}")]
    Decode { key: String, reason: String },
}
