use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the translation provider.
///
/// These never leave the translation layer: the service logs them and falls
/// back to the original text.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Connection, TLS or body-read failure
    #[error("Failed to reach translation provider: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Translation provider error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    /// Success status but the body was not `{ "translatedText": ... }`
    #[error("Malformed translation response: {0}")]
    Malformed(String),

    #[error("Translation request timed out after {0:?}")]
    Timeout(Duration),
}

impl TranslationError {
    /// Retry transport errors, timeouts, rate limits and 5xx; other 4xx are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::Transport(_) | TranslationError::Timeout(_) => true,
            TranslationError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            TranslationError::Malformed(_) => false,
        }
    }
}
