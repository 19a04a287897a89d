//! Mapping of transport failures onto inference errors

use colloquy_core::{Error as CoreError, InferenceErrorKind};
use std::time::Duration;
use tracing::warn;

/// Failures raised by an [`HttpClient`](crate::http::HttpClient)
///
/// Adapters never let these escape; they convert them with
/// [`HttpError::into_inference`].
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request could not be sent or the body could not be read
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Parsed `Retry-After` header, if any
        retry_after: Option<Duration>,
        /// Response body text
        body: String,
    },

    /// The response body was not valid JSON
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The connection broke while reading a streamed body
    #[error("stream interrupted: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// The inference subcode this failure maps to
    pub fn kind(&self) -> InferenceErrorKind {
        match self {
            HttpError::Transport(err) if err.is_timeout() => InferenceErrorKind::Timeout,
            HttpError::Transport(err) if err.is_decode() => InferenceErrorKind::MalformedResponse,
            HttpError::Transport(_) | HttpError::Io(_) => InferenceErrorKind::Network,
            HttpError::Status { status, .. } => status_kind(*status),
            HttpError::Decode(_) => InferenceErrorKind::MalformedResponse,
        }
    }

    /// Convert into the core inference failure for `provider`
    pub fn into_inference(self, provider: &str) -> CoreError {
        let kind = self.kind();
        let retry_after = match &self {
            HttpError::Status { retry_after, .. } => *retry_after,
            _ => None,
        };
        warn!(provider, %kind, error = %self, "Provider call failed");

        CoreError::Inference {
            provider: provider.to_string(),
            kind,
            message: self.to_string(),
            retry_after,
            source: Some(Box::new(self)),
        }
    }
}

/// Classify an HTTP status code
pub fn status_kind(status: u16) -> InferenceErrorKind {
    match status {
        401 | 403 => InferenceErrorKind::Authentication,
        429 => InferenceErrorKind::RateLimited,
        408 | 504 => InferenceErrorKind::Timeout,
        400..=499 => InferenceErrorKind::Rejected,
        _ => InferenceErrorKind::Provider,
    }
}

/// Parse a `Retry-After` header given in seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Inference failure for a call that outlived its deadline
pub fn timeout_error(provider: &str, after: Duration) -> CoreError {
    warn!(provider, timeout_ms = after.as_millis() as u64, "Provider call timed out");
    CoreError::inference(
        provider,
        InferenceErrorKind::Timeout,
        format!("no response within {}ms", after.as_millis()),
    )
}

/// Inference failure for a provider payload that could not be understood
pub fn malformed_response(provider: &str, message: impl Into<String>) -> CoreError {
    CoreError::inference(provider, InferenceErrorKind::MalformedResponse, message)
}

/// Inference failure for an error object reported inside a provider payload
pub fn provider_reported(provider: &str, message: impl Into<String>) -> CoreError {
    CoreError::inference(provider, InferenceErrorKind::Provider, message)
}
