//! The backend's response envelope.
//!
//! Every API response is wrapped as
//! `{ "statusCode": 200, "error": null, "message": "...", "data": { ... } }`.
//! `message` is usually a string but validation failures send a list.

use serde::Deserialize;

use hunterdash_domain::resource::Page;

use crate::error::HttpError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope<T> {
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub message: Option<serde_json::Value>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Human readable explanation, preferring `message` over `error`.
    pub(crate) fn explanation(&self) -> Option<String> {
        let message = match &self.message {
            Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text.clone()),
            Some(serde_json::Value::Array(items)) if !items.is_empty() => Some(
                items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        };
        message.or_else(|| self.error.clone().filter(|e| !e.is_empty()))
    }
}

/// Decode a successful body into a page.
pub(crate) fn decode_page<R>(body: &[u8]) -> Result<Page<R>, HttpError>
where
    R: serde::de::DeserializeOwned,
{
    let envelope: Envelope<Page<R>> = serde_json::from_slice(body)?;
    if let Some(status) = envelope.status_code.filter(|code| *code >= 400) {
        return Err(HttpError::Status {
            status,
            message: envelope.explanation(),
        });
    }
    envelope.data.ok_or(HttpError::MissingData)
}

/// Best-effort explanation from an error body.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.explanation())
}
