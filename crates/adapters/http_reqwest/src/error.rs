//! HTTP-specific error type wrapping reqwest and decoding errors.

use hunterdash_domain::error::{DashError, MalformedError, StatusError};

/// Errors originating from the HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The configured base URL (or a URL derived from it) is invalid.
    #[error("invalid backend URL")]
    InvalidUrl(#[from] url::ParseError),

    /// The reqwest client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed")]
    Request(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Status { status: u16, message: Option<String> },

    /// The body is not a valid response envelope.
    #[error("failed to decode response body")]
    Decode(#[from] serde_json::Error),

    /// The envelope carried no `data` block.
    #[error("response envelope has no data")]
    MissingData,
}

impl From<HttpError> for DashError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, message } => StatusError { status, message }.into(),
            HttpError::Decode(err) => MalformedError::Json(err).into(),
            HttpError::MissingData => MalformedError::MissingData.into(),
            other => Self::Transport(Box::new(other)),
        }
    }
}
