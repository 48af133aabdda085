use shared::error::{ApiErrorBody, ErrorCode};
use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server rejected request (status {status}): {}", .body.summary().unwrap_or("no message"))]
    Rejected { status: u16, body: ApiErrorBody },
    #[error("resource not found")]
    NotFound,
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
}

impl ClientError {
    pub fn rejected(status: u16, body: ApiErrorBody) -> Self {
        Self::Rejected { status, body }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Timeout => ErrorCode::Timeout,
            ClientError::Transport(_) => ErrorCode::Transport,
            ClientError::Rejected { .. } => ErrorCode::Rejected,
            ClientError::NotFound => ErrorCode::NotFound,
            ClientError::Decode(_) => ErrorCode::Decode,
            ClientError::Validation(_) => ErrorCode::Validation,
        }
    }

    /// The single line shown to the user for this failure.
    ///
    /// Field-level messages win over the server summary; anything the server did
    /// not explain (timeouts, transport, undecodable bodies) uses `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Rejected { body, .. } => body
                .errors
                .values()
                .find_map(|messages| messages.first())
                .map(String::as_str)
                .or_else(|| body.summary())
                .unwrap_or(fallback)
                .to_string(),
            ClientError::Validation(errors) => errors
                .first_message()
                .unwrap_or(fallback)
                .to_string(),
            ClientError::Timeout
            | ClientError::Transport(_)
            | ClientError::NotFound
            | ClientError::Decode(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
