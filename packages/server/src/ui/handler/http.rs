//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    domain::MessageId,
    infrastructure::dto::{
        http::{CreateMessageRequest, EvictionDto, RecentMessagesQuery, UpdateMessageRequest},
        websocket::{MessageDto, PresenceDto},
    },
    ui::{auth::AuthenticatedUser, error::ApiError, state::AppState},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `GET /api/presence`
pub async fn get_presence(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(_identity): AuthenticatedUser,
) -> Json<Vec<PresenceDto>> {
    let roster = state.get_presence_usecase.execute().await;
    Json(roster.into_iter().map(PresenceDto::from).collect())
}

/// `GET /api/messages?limit=`
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(_identity): AuthenticatedUser,
    Query(query): Query<RecentMessagesQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let messages = state.manage_messages_usecase.recent(query.limit).await?;
    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}

/// `POST /api/messages`
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(request): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let message = state
        .manage_messages_usecase
        .create(&identity, request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

/// `PUT /api/messages/{id}`
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMessageRequest>,
) -> Result<Json<MessageDto>, ApiError> {
    let message = state
        .manage_messages_usecase
        .update(&identity, MessageId::new(id), request.content)
        .await?;
    Ok(Json(message.into()))
}

/// `DELETE /api/messages/{id}`
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageDto>, ApiError> {
    let message = state
        .manage_messages_usecase
        .delete(&identity, MessageId::new(id))
        .await?;
    Ok(Json(message.into()))
}

/// `DELETE /api/users/{id}/connections` (admin only)
pub async fn evict_user_connections(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> Result<Json<EvictionDto>, ApiError> {
    let evicted = state.evict_user_usecase.execute(&identity, user_id).await?;
    Ok(Json(EvictionDto {
        user_id,
        evicted_connections: evicted,
    }))
}
