//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`DashError`]
//! at the port boundary via `From`.

use std::error::Error as StdError;

/// Top-level error returned by resource fetches.
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    /// The request never produced a response (connection, timeout, …).
    #[error("transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The backend answered with a non-success status.
    #[error("backend rejected request")]
    Status(#[from] StatusError),

    /// The response could not be decoded into a page.
    #[error("malformed response")]
    Malformed(#[from] MalformedError),

    /// The fetch was cancelled before it completed.
    #[error("fetch cancelled")]
    Cancelled,
}

impl DashError {
    /// Render the error together with its whole source chain,
    /// e.g. `backend rejected request: HTTP 503: maintenance`.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

/// Non-success status reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct StatusError {
    pub status: u16,
    pub message: Option<String>,
}

/// Ways a response body can fail to describe a page.
#[derive(Debug, thiserror::Error)]
pub enum MalformedError {
    /// The envelope carried no `data` block.
    #[error("response envelope has no data")]
    MissingData,

    /// The body is not valid JSON or lacks required fields such as `meta.total`.
    #[error("invalid JSON payload")]
    Json(#[from] serde_json::Error),
}
