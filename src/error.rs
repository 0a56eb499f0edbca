//! Error types for the Lectern client

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a non-success HTTP status from a collaborator into an error.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                AppError::Authentication(format!("{}: {}", context, status))
            }
            reqwest::StatusCode::NOT_FOUND => {
                AppError::NotFound(format!("{}: {}", context, status))
            }
            reqwest::StatusCode::CONFLICT => {
                AppError::Conflict(format!("{}: {}", context, status))
            }
            s if s.is_client_error() => AppError::BadRequest(format!("{}: {}", context, s)),
            s => AppError::Remote(format!("{}: {}", context, s)),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
