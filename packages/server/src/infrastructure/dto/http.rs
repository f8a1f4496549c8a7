//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMessageRequest {
    pub content: String,
}

/// Query parameters for `GET /api/messages`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentMessagesQuery {
    pub limit: Option<usize>,
}

/// Response body of `DELETE /api/users/{id}/connections`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvictionDto {
    pub user_id: i64,
    pub evicted_connections: usize,
}

/// Error body returned with every non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDto {
    pub error: String,
}
