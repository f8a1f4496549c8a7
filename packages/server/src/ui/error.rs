//! HTTP error responses: status code plus a `{"error": "..."}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::{AuthenticationError, StoreError},
    infrastructure::dto::http::ApiErrorDto,
    usecase::{EvictUserError, MessageCommandError},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiErrorDto {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(e: AuthenticationError) -> Self {
        match e {
            AuthenticationError::VerifierUnavailable(_) => ApiError::Unavailable(e.to_string()),
            _ => ApiError::Unauthorized(e.to_string()),
        }
    }
}

impl From<MessageCommandError> for ApiError {
    fn from(e: MessageCommandError) -> Self {
        match e {
            MessageCommandError::InvalidContent(_) => ApiError::BadRequest(e.to_string()),
            MessageCommandError::NotFound(_) | MessageCommandError::Store(StoreError::NotFound(_)) => {
                ApiError::NotFound(e.to_string())
            }
            MessageCommandError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            MessageCommandError::Store(StoreError::Unavailable(_)) => {
                ApiError::Unavailable(e.to_string())
            }
        }
    }
}

impl From<EvictUserError> for ApiError {
    fn from(e: EvictUserError) -> Self {
        match e {
            EvictUserError::Forbidden => ApiError::Forbidden(e.to_string()),
            EvictUserError::InvalidUser(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}
