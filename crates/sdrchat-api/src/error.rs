use thiserror::Error;

/// Why a call to the chat service failed.
///
/// The response body of a failed call is not inspected; only the status is kept.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("chat service returned {status} {reason}")]
    Http { status: u16, reason: String },

    #[error("chat service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response from chat service: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn http(status: u16, reason: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
