use crate::shared::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("credential rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("server rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected response payload: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unauthorized { .. } => AppError::Unauthorized(err.to_string()),
            other => AppError::Network(other.to_string()),
        }
    }
}
