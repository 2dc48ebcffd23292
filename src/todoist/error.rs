//! Error types for Todoist API calls.

use reqwest::StatusCode;
use serde_json::Value;

/// Body of a non-success response, classified at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// JSON error payload (REST endpoints)
    Structured(Value),
    /// Plain-text payload (the command batch endpoint)
    PlainText(String),
    Empty,
}

impl ErrorBody {
    /// Classify a raw response body.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ErrorBody::Empty;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) if value.is_object() || value.is_array() => ErrorBody::Structured(value),
            _ => ErrorBody::PlainText(trimmed.to_string()),
        }
    }

    /// The most useful human-readable line the body carries, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            ErrorBody::Structured(value) => ["error", "message", "detail"]
                .iter()
                .find_map(|field| value.get(field).and_then(Value::as_str))
                .map(str::to_string),
            ErrorBody::PlainText(text) => Some(text.clone()),
            ErrorBody::Empty => None,
        }
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(message) => f.write_str(&message),
            None => f.write_str("no details"),
        }
    }
}

/// Failure of a single Todoist API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: ErrorBody },

    #[error("Command rejected ({error_code}): {message}")]
    Command { error_code: i64, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("{}", crate::constants::ERROR_NO_CREDENTIAL)]
    MissingCredential,

    #[error("{}", crate::constants::ERROR_NO_SYNC_CURSOR)]
    MissingCursor,

    #[error("{}", crate::constants::ERROR_REQUEST_TIMEOUT)]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Superseded by a newer request")]
    Superseded,

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Best available human-readable message for the error slot.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { status, body } => match body.message() {
                Some(message) => format!("HTTP {}: {}", status.as_u16(), message),
                None => format!("HTTP {}", status.as_u16()),
            },
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}
