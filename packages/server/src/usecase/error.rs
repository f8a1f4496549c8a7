//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{MessageId, StoreError, ValueObjectError};

/// Message command (create / update / delete) errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageCommandError {
    #[error("Invalid message: {0}")]
    InvalidContent(#[from] ValueObjectError),

    #[error("Message {0} not found")]
    NotFound(MessageId),

    /// Only the author or an admin may edit or delete a message
    #[error("Not allowed to modify message {0}")]
    Forbidden(MessageId),

    #[error("Message store error: {0}")]
    Store(#[from] StoreError),
}

/// Private message errors (reported back to the sending connection only)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivateMessageError {
    #[error("Invalid private message: {0}")]
    Invalid(#[from] ValueObjectError),
}

/// Forced eviction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvictUserError {
    #[error("Only admins may evict connections")]
    Forbidden,

    #[error("Invalid user: {0}")]
    InvalidUser(#[from] ValueObjectError),
}
