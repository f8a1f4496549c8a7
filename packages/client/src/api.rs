//! HTTP API calls used by the terminal client.

use atrium_server::infrastructure::dto::{
    http::{ApiErrorDto, CreateMessageRequest, UpdateMessageRequest},
    websocket::{MessageDto, PresenceDto},
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Thin wrapper over the `/api` routes, authenticated with the session token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn recent_messages(&self, limit: Option<usize>) -> Result<Vec<MessageDto>, ClientError> {
        let mut request = self.http.get(self.url("/api/messages")).bearer_auth(&self.token);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        decode(request.send().await?).await
    }

    pub async fn post_message(&self, content: String) -> Result<MessageDto, ClientError> {
        let response = self
            .http
            .post(self.url("/api/messages"))
            .bearer_auth(&self.token)
            .json(&CreateMessageRequest { content })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn edit_message(&self, id: i64, content: String) -> Result<MessageDto, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/api/messages/{}", id)))
            .bearer_auth(&self.token)
            .json(&UpdateMessageRequest { content })
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_message(&self, id: i64) -> Result<MessageDto, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/messages/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn presence(&self) -> Result<Vec<PresenceDto>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/presence"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let reason = response
        .json::<ApiErrorDto>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::AuthenticationFailed(reason));
    }
    Err(ClientError::Http(format!("{}: {}", status, reason)))
}
