use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error envelope returned by the provider on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderErrorEnvelope {
    pub error: ProviderErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{status} ({code}): {message}")]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl ProviderErrorBody {
    pub fn new(code: u16, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: status.into(),
        }
    }

    /// Parses a provider error body, falling back to the raw text.
    pub fn from_response_text(http_status: u16, text: &str) -> Self {
        match serde_json::from_str::<ProviderErrorEnvelope>(text) {
            Ok(envelope) => envelope.error,
            Err(_) => Self::new(http_status, "UNKNOWN", text.trim()),
        }
    }
}
