//! Remote credential verifier.
//!
//! POSTs `{"token": "..."}` to the configured endpoint. A 2xx response carries
//! `{userId, username, isAdmin, isActive}`; 401/403/404 mean the token is not
//! valid; anything else (including timeouts) means the verifier is unavailable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::VerifiedUser;
use crate::domain::{AuthenticationError, CredentialVerifier, Identity};

pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpCredentialVerifier {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpCredentialVerifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_VERIFY_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CredentialVerifier for HttpCredentialVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthenticationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&VerifyRequest { token })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AuthenticationError::VerifierUnavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let user = response
                    .json::<VerifiedUser>()
                    .await
                    .map_err(|e| AuthenticationError::MalformedIdentity(e.to_string()))?;
                Identity::try_from(user)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                Err(AuthenticationError::InvalidToken)
            }
            status => Err(AuthenticationError::VerifierUnavailable(format!(
                "unexpected status {} from {}",
                status, self.endpoint
            ))),
        }
    }
}
