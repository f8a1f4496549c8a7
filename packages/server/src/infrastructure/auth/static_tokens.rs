//! Static token verifier backed by a JSON credentials file.
//!
//! ```json
//! [
//!   { "token": "alice-token", "userId": 1, "username": "alice", "isAdmin": true },
//!   { "token": "bob-token", "userId": 2, "username": "bob", "isActive": false }
//! ]
//! ```

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::VerifiedUser;
use crate::domain::{AuthenticationError, CredentialVerifier, Identity};

#[derive(Debug, Error)]
pub enum TokenFileError {
    #[error("failed to read token file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse token file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid entry for token #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("token #{0} is defined more than once")]
    DuplicateToken(usize),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    #[serde(flatten)]
    pub user: VerifiedUser,
}

#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    identities: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn from_entries(entries: Vec<TokenEntry>) -> Result<Self, TokenFileError> {
        let mut identities = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if entry.token.trim().is_empty() {
                return Err(TokenFileError::InvalidEntry {
                    index,
                    reason: "empty token".to_string(),
                });
            }
            let identity = Identity::try_from(entry.user).map_err(|e| TokenFileError::InvalidEntry {
                index,
                reason: e.to_string(),
            })?;
            if identities.insert(entry.token, identity).is_some() {
                return Err(TokenFileError::DuplicateToken(index));
            }
        }
        Ok(Self { identities })
    }

    pub fn from_json_str(json: &str) -> Result<Self, TokenFileError> {
        let entries: Vec<TokenEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TokenFileError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthenticationError> {
        self.identities
            .get(token)
            .cloned()
            .ok_or(AuthenticationError::InvalidToken)
    }
}
