use shared::error::ApiError;
use thiserror::Error;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{}", .0.detail)]
    Api(#[from] ApiError),
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid input: {0}")]
    Validation(String),
}

impl ClientError {
    /// Message suitable for an alert: the server's `detail` for API errors,
    /// the full error text otherwise.
    pub fn detail(&self) -> String {
        match self {
            Self::Api(err) => err.detail.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
