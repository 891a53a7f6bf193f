//! Error kinds shared by the transport, the controller and the view models.

use std::time::Duration;

use shared::{domain::TeacherId, error::ApiError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request could not complete: {0}")]
    NetworkFailure(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("server responded with status {status}: {message}")]
    HttpError { status: u16, message: String },
    #[error("malformed response body: {0}")]
    ParseFailure(String),
    #[error("teacher {0} not found")]
    NotFound(TeacherId),
    #[error("invalid form: {}", .fields.join(", "))]
    ValidationFailure { fields: Vec<String> },
    #[error("not signed in")]
    Unauthenticated,
    /// The action is not available in the form's current state.
    #[error("action not available while {0}")]
    InvalidState(String),
}

impl ClientError {
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout)
        } else if err.is_decode() {
            ClientError::ParseFailure(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            }
        } else {
            ClientError::NetworkFailure(err.to_string())
        }
    }

    /// Builds an `HttpError` from a non-2xx status and whatever body came with it.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = match ApiError::from_body(body) {
            Some(api_error) => api_error.message,
            None => status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        };
        ClientError::HttpError {
            status: status.as_u16(),
            message,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated | ClientError::HttpError { status: 401, .. }
        )
    }

    /// Text shown to the person operating the screen.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NetworkFailure(_) => {
                "Server unreachable; check the connection and retry.".to_string()
            }
            ClientError::Timeout(after) => format!(
                "The server did not answer within {}s; retry in a moment.",
                after.as_secs()
            ),
            ClientError::HttpError { status: 401, .. } => {
                "Your session has expired; sign in again.".to_string()
            }
            ClientError::HttpError { status: 403, .. } => {
                "You are not allowed to perform this operation.".to_string()
            }
            ClientError::HttpError { status, message } => {
                format!("The server rejected the request ({status}): {message}")
            }
            ClientError::ParseFailure(_) => {
                "The server answered with data that could not be read.".to_string()
            }
            ClientError::NotFound(_) => "The requested teacher was not found.".to_string(),
            ClientError::ValidationFailure { fields } => {
                format!("Please fill in valid values for: {}", fields.join(", "))
            }
            ClientError::Unauthenticated => "Sign in to continue.".to_string(),
            ClientError::InvalidState(_) => "That action is not available right now.".to_string(),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
