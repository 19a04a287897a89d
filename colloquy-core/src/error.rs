//! Error types for the Colloquy library

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// The main error type for all Colloquy operations
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A chat history failed strict normalization
    Normalization(NormalizationError),

    /// The backing provider failed to produce a completion
    Inference {
        /// Provider name (e.g., "openai")
        provider: String,
        /// Coarse classification of the failure
        kind: InferenceErrorKind,
        /// Error message
        message: String,
        /// Time to wait before retrying (for rate limits)
        retry_after: Option<Duration>,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Configuration errors
    Configuration(String),

    /// Serialization/deserialization errors on local data
    Serialization {
        /// Error message
        message: String,
        /// Underlying error if available
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// Closed set of inference failure subcodes
///
/// Adapters collapse their native error sets into one of these so callers
/// can branch on a single kind without knowing the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferenceErrorKind {
    /// Connection, DNS, or transport failure
    Network,
    /// Credentials missing or refused
    Authentication,
    /// The provider throttled the request
    RateLimited,
    /// The call did not finish before its deadline
    Timeout,
    /// The provider rejected the request
    Rejected,
    /// The provider answered with something that could not be understood
    MalformedResponse,
    /// Any other provider-reported failure
    Provider,
}

/// Strict-mode normalization failures
///
/// Each variant carries the index of the offending message in the history.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// Tool message has no `tool_call_id` in its metadata
    #[error("tool message at index {index} has no tool_call_id metadata")]
    MissingToolCallId {
        /// Position in the chat history
        index: usize,
    },
    /// Tool message has no `function_name` in its metadata
    #[error("tool message at index {index} has no function_name metadata")]
    MissingFunctionName {
        /// Position in the chat history
        index: usize,
    },
    /// A linkage metadata value is not a string
    #[error("tool message at index {index} has a non-string `{key}` metadata value")]
    InvalidMetadataValue {
        /// Position in the chat history
        index: usize,
        /// The metadata key holding the bad value
        key: &'static str,
    },
}

impl Error {
    /// Build an inference failure without an underlying source
    pub fn inference(
        provider: impl Into<String>,
        kind: InferenceErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Error::Inference {
            provider: provider.into(),
            kind,
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    /// Whether this error came from the backing provider
    pub fn is_inference(&self) -> bool {
        matches!(self, Error::Inference { .. })
    }

    /// The inference subcode, if this is an inference failure
    pub fn inference_kind(&self) -> Option<InferenceErrorKind> {
        match self {
            Error::Inference { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Suggested delay before retrying, when the provider sent one
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Inference { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Normalization(err) => write!(f, "Normalization error: {}", err),
            Error::Inference {
                provider,
                kind,
                message,
                ..
            } => write!(f, "Inference failure ({}, {}): {}", provider, kind, message),
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Serialization { message, .. } => write!(f, "Serialization error: {}", message),
        }
    }
}

impl fmt::Display for InferenceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InferenceErrorKind::Network => "network",
            InferenceErrorKind::Authentication => "authentication",
            InferenceErrorKind::RateLimited => "rate_limited",
            InferenceErrorKind::Timeout => "timeout",
            InferenceErrorKind::Rejected => "rejected",
            InferenceErrorKind::MalformedResponse => "malformed_response",
            InferenceErrorKind::Provider => "provider",
        };
        f.write_str(name)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Normalization(err) => Some(err),
            Error::Inference { source, .. } | Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static)),
            Error::Configuration(_) => None,
        }
    }
}

/// Result type alias for Colloquy operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<NormalizationError> for Error {
    fn from(err: NormalizationError) -> Self {
        Error::Normalization(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
