//! Handshake authentication.
//!
//! The bearer token comes from `Authorization: Bearer <token>`; clients that
//! cannot set headers (browsers opening a WebSocket) may pass `?token=`.
//! Rejection happens before any handler runs, so a failed handshake never
//! reaches the upgrade and no Connection is created.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;

use crate::domain::Identity;

use super::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Extractor resolving the request's bearer token to an active identity
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Token presented with the request, header first
pub fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_string())
        });
    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.token)
    })
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts);
        match state.authenticate_usecase.execute(token.as_deref()).await {
            Ok(identity) => Ok(AuthenticatedUser(identity)),
            Err(e) => {
                tracing::warn!("Rejected {} {}: {}", parts.method, parts.uri.path(), e);
                Err(e.into())
            }
        }
    }
}
