use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the typed API client. The catalog and preset
/// endpoints all funnel through these variants; callers that only care
/// about "did it work" can treat the variants uniformly.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server rejected request with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
