//! Error handling for the Kindred server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kindred::KindredError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// Kindred engine error
    #[error("{0}")]
    Kindred(#[from] KindredError),

    /// Subtree dissolution failed partway
    #[error("{0}")]
    Dissolve(#[from] kindred::processor::DissolveError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Kindred(err) => kindred_status(err),
            // A dissolution that failed before touching anything surfaces
            // the underlying cause; partial progress is a server-side state.
            ServerError::Dissolve(err) if err.updated.is_empty() => kindred_status(&err.source),
            ServerError::Dissolve(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) | ServerError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Kindred(err) => err.code(),
            ServerError::Dissolve(_) => "DISSOLVE_PARTIAL_FAILURE",
            ServerError::Validation(_) => "VALIDATION_FAILED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Serialization(_) => "SERIALIZATION_FAILED",
        }
    }
}

/// Map engine error kinds onto HTTP statuses.
fn kindred_status(err: &KindredError) -> StatusCode {
    match err {
        KindredError::MemberNotFound { .. }
        | KindredError::SeniorNotFound { .. }
        | KindredError::JuniorNotFound { .. } => StatusCode::NOT_FOUND,
        KindredError::SeniorFull { .. }
        | KindredError::JuniorAlreadyLinked { .. }
        | KindredError::NoLinkToBreak { .. }
        | KindredError::NoSenior { .. }
        | KindredError::RepCapExceeded { .. }
        | KindredError::InsufficientRep { .. }
        | KindredError::AlreadyExists { .. } => StatusCode::CONFLICT,
        KindredError::LevelGapTooLarge { .. }
        | KindredError::LocationMismatch { .. }
        | KindredError::SelfReference { .. }
        | KindredError::InvalidActivityType { .. }
        | KindredError::Validation(_) => StatusCode::BAD_REQUEST,
        KindredError::Storage(_) | KindredError::Configuration(_) | KindredError::Logging(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
