//! Message types for conversations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Metadata key linking a tool result to the call that requested it
pub const TOOL_CALL_ID_KEY: &str = "tool_call_id";

/// Metadata key naming the function a tool result came from
pub const FUNCTION_NAME_KEY: &str = "function_name";

/// Free-form metadata attached to a message
pub type Metadata = Map<String, Value>;

/// The role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Tool message (function result)
    Tool,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn in a conversation
///
/// The role is fixed at construction. Every other field is optional and is
/// left out of normalized output when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Author or function name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Model that produced this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Raw provider-native payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_content: Option<Value>,
    /// Charset tag of the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Which completion choice this message came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_index: Option<u32>,
    /// Additional metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ChatMessage {
    /// Create a message with a role and no other fields set
    pub fn new(role: Role) -> Self {
        Self {
            role,
            content: None,
            name: None,
            model_id: None,
            inner_content: None,
            encoding: None,
            choice_index: None,
            metadata: None,
        }
    }

    /// Create a simple text message
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self::new(role).with_content(text)
    }

    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// Create a tool message with no linkage metadata
    pub fn tool(text: impl Into<String>) -> Self {
        Self::text(Role::Tool, text)
    }

    /// Create a tool result linked back to the call that requested it
    pub fn tool_result(
        text: impl Into<String>,
        tool_call_id: impl Into<String>,
        function_name: impl Into<String>,
    ) -> Self {
        Self::tool(text)
            .with_metadata_entry(TOOL_CALL_ID_KEY, Value::String(tool_call_id.into()))
            .with_metadata_entry(FUNCTION_NAME_KEY, Value::String(function_name.into()))
    }

    /// The role of the message sender
    pub fn role(&self) -> Role {
        self.role
    }

    /// Set the text content
    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        self.content = Some(text.into());
        self
    }

    /// Set the author name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the producing model
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Attach the raw provider payload
    pub fn with_inner_content(mut self, inner: Value) -> Self {
        self.inner_content = Some(inner);
        self
    }

    /// Set the content encoding
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Set the completion choice index
    pub fn with_choice_index(mut self, index: u32) -> Self {
        self.choice_index = Some(index);
        self
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Insert a single metadata entry, creating the map if needed
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value.into());
        self
    }

    /// Tool call id from the metadata, if present and a string
    pub fn tool_call_id(&self) -> Option<&str> {
        self.metadata_str(TOOL_CALL_ID_KEY)
    }

    /// Function name from the metadata, if present and a string
    pub fn function_name(&self) -> Option<&str> {
        self.metadata_str(FUNCTION_NAME_KEY)
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}
