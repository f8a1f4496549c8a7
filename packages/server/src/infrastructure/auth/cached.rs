//! Cache-backed credential verifier.
//!
//! Keeps resolved identities in the shared cache tier as short-lived session
//! blobs under `session:<sha256(token)>`, so raw bearer tokens never reach the
//! cache tier. Cache failures and undecodable blobs fall back to the inner
//! verifier; rejections are never cached.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::{AuthenticationError, CacheTier, CredentialVerifier, Identity};

pub struct CachedCredentialVerifier {
    inner: Arc<dyn CredentialVerifier>,
    cache: Arc<dyn CacheTier>,
    ttl: Duration,
}

impl CachedCredentialVerifier {
    pub fn new(inner: Arc<dyn CredentialVerifier>, cache: Arc<dyn CacheTier>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn session_key(token: &str) -> String {
        format!("session:{}", hex::encode(Sha256::digest(token.as_bytes())))
    }

    async fn cached_identity(&self, key: &str) -> Option<Identity> {
        match self.cache.get(key).await {
            Ok(Some(blob)) => match serde_json::from_str::<Identity>(&blob) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    tracing::warn!("Discarding undecodable session blob: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Session cache read failed, verifying upstream: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl CredentialVerifier for CachedCredentialVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthenticationError> {
        let key = Self::session_key(token);
        if let Some(identity) = self.cached_identity(&key).await {
            tracing::trace!("Session cache hit for user {}", identity.user_id);
            return Ok(identity);
        }

        let identity = self.inner.verify(token).await?;
        match serde_json::to_string(&identity) {
            Ok(blob) => {
                if let Err(e) = self.cache.set(&key, blob, self.ttl).await {
                    tracing::warn!("Failed to cache session for user {}: {}", identity.user_id, e);
                }
            }
            Err(e) => tracing::warn!("Failed to encode session blob: {}", e),
        }
        Ok(identity)
    }
}
