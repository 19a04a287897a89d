//! Common traits for provider implementations

use colloquy_core::{
    ChatMessage, CompletionOptions, Error, ExecutionSettings, NormalizedRecord,
    StreamingChatMessage,
};
use serde_json::Value;

/// Everything a converter needs to build one request body
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Model to ask
    pub model: &'a str,
    /// Normalized message list
    pub messages: &'a [NormalizedRecord],
    /// Opaque generation settings
    pub settings: &'a ExecutionSettings,
    /// Per-call options
    pub options: &'a CompletionOptions,
    /// Whether to ask for a streamed response
    pub stream: bool,
}

/// Convert requests to provider-specific format
pub trait RequestConverter: Send + Sync {
    /// Build the provider-specific JSON body
    fn convert_request(&self, request: ChatRequest<'_>) -> Result<Value, Error>;
}

/// Parse responses from provider-specific format
pub trait ResponseParser: Send + Sync {
    /// Parse a complete provider response into one message per choice
    fn parse_response(&self, value: Value) -> Result<Vec<ChatMessage>, Error>;
}

/// Parse streaming events from provider-specific format
pub trait StreamEventParser: Send + Sync {
    /// Parse one event payload into the chunks it carries
    ///
    /// `Ok(None)` means the payload carried nothing for the caller.
    fn parse_event(&self, data: &str) -> Result<Option<Vec<StreamingChatMessage>>, Error>;
}
