//! Application error type for the HTTP surface.
//!
//! Every handler returns [`AppError`]; the `IntoResponse` impl maps it to
//! a status code and a JSON body. Server-class failures are captured to
//! Sentry and logged, and their detail never reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ChatError;

/// Application-level error type for the chat backend.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// What the client is allowed to see. Server-class errors collapse to
    /// a generic message.
    fn client_message(&self) -> String {
        if self.status().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Database(e) => Self::Database(e),
            ChatError::ConversationNotFound => Self::NotFound("conversation".to_string()),
        }
    }
}

/// Error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "chat request failed"
            );
        }

        let body = ErrorResponse {
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        let err = AppError::NotFound("conversation".to_string());
        assert_eq!(err.client_message(), "not found: conversation");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.client_message(), "bad request: invalid input");
    }

    #[test]
    fn test_server_errors_are_not_leaked() {
        let err = AppError::Internal("pool exhausted at 10 connections".to_string());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AppError::Database(RepositoryError::NotFound);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conversation_not_found_maps_to_404() {
        let err: AppError = ChatError::ConversationNotFound.into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
