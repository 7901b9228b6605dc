//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All API handlers return
//! `Result<T, AppError>`.
//!
//! Every error response is a JSON body of the form
//! `{"success": false, "message": "..."}`. Internal details (paths, I/O
//! errors) never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type for the mock server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Login name and password did not match a user.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Record, profile or resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method not supported on this path.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Duplicate registration or id.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl AppError {
    /// Map a store `NotFound` to a handler-specific message.
    ///
    /// Other store errors pass through unchanged.
    #[must_use]
    pub fn not_found_as(err: StoreError, message: &str) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(message.to_string()),
            other => Self::Store(other),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(err) => match err {
                StoreError::UnknownResource(_) | StoreError::NotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                StoreError::DuplicateId { .. } => StatusCode::CONFLICT,
                StoreError::InvalidRecord(_) | StoreError::InvalidName(_) => {
                    StatusCode::BAD_REQUEST
                }
                StoreError::DataCorruption { .. }
                | StoreError::Read { .. }
                | StoreError::Write { .. }
                | StoreError::Encode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message shown to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg.clone(),
            Self::InvalidCredentials | Self::MethodNotAllowed => self.to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Store(err) => match err {
                StoreError::UnknownResource(resource) => format!("{resource} not found"),
                StoreError::NotFound { resource, .. } => format!("{resource} not found"),
                StoreError::DuplicateId { resource, id } => {
                    format!("{resource} {id} already exists")
                }
                StoreError::InvalidRecord(e) => e.to_string(),
                StoreError::InvalidName(e) => e.to_string(),
                StoreError::Write { .. } | StoreError::Encode { .. } => {
                    "Failed to save data".to_string()
                }
                StoreError::DataCorruption { .. } | StoreError::Read { .. } => {
                    "Internal server error".to_string()
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
