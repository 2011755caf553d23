use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400..=499 => Self::Validation,
            _ => Self::Internal,
        }
    }
}

/// Error body returned by the REST API: `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?} ({status}): {detail}")]
pub struct ApiError {
    pub status: u16,
    pub code: ErrorCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            detail: detail.into(),
        }
    }

    /// Builds an error from a raw response body, preferring the server's
    /// `detail` and falling back to `fallback` when the body has none.
    pub fn from_body(status: u16, body: &[u8], fallback: &str) -> Self {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .map(|body| body.detail)
            .ok()
            .filter(|detail| !detail.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self::new(status, detail)
    }
}
