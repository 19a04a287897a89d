//! Core traits and types for the Colloquy chat completion library
//!
//! This crate defines the message model, the history normalizer that shapes
//! messages for provider requests, and the [`ChatCompletionClient`] contract
//! that backend adapters implement. It performs no I/O.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

// Re-export commonly used items
pub use client::{
    AiServiceClient, BoxChatStream, ChatCompletionClient, MessageType, ServiceInfo, StreamItem,
};
pub use error::{Error, InferenceErrorKind, NormalizationError, Result};
pub use normalize::{normalize, normalize_message, normalize_strict, NormalizedRecord};
pub use types::{
    history::ChatHistory,
    message::{ChatMessage, Metadata, Role, FUNCTION_NAME_KEY, TOOL_CALL_ID_KEY},
    settings::{CompletionOptions, ExecutionSettings},
    stream::{StreamAccumulator, StreamingChatMessage},
};
