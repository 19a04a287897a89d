//! Streaming types for incremental responses

use crate::types::message::{ChatMessage, Metadata, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A partial chunk of a streamed response
///
/// Chunks that share a `choice_index` belong to the same logical response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingChatMessage {
    /// Role, usually only present on the first chunk of a choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Text delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Which completion choice this chunk extends
    pub choice_index: u32,
    /// Model that produced this chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Raw provider-native payload for this chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_content: Option<Value>,
    /// Additional metadata (e.g. `finish_reason`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl StreamingChatMessage {
    /// Create an empty chunk for a choice
    pub fn new(choice_index: u32) -> Self {
        Self {
            role: None,
            content: None,
            choice_index,
            model_id: None,
            inner_content: None,
            metadata: None,
        }
    }

    /// Create a text delta for a choice
    pub fn delta(choice_index: u32, text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::new(choice_index)
        }
    }

    /// Set the role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the producing model
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}

/// Folds streamed chunks into complete messages, one per choice
///
/// Content is concatenated in arrival order. The first role and model seen
/// for a choice win; metadata entries from later chunks overwrite earlier
/// ones.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    choices: BTreeMap<u32, PartialMessage>,
}

#[derive(Debug, Default)]
struct PartialMessage {
    role: Option<Role>,
    content: String,
    model_id: Option<String>,
    metadata: Metadata,
}

impl StreamAccumulator {
    /// Create a new accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one chunk
    pub fn push(&mut self, chunk: StreamingChatMessage) {
        let partial = self.choices.entry(chunk.choice_index).or_default();
        if partial.role.is_none() {
            partial.role = chunk.role;
        }
        if partial.model_id.is_none() {
            partial.model_id = chunk.model_id;
        }
        if let Some(text) = chunk.content {
            partial.content.push_str(&text);
        }
        if let Some(metadata) = chunk.metadata {
            partial.metadata.extend(metadata);
        }
    }

    /// Process every chunk of one stream increment
    pub fn push_all(&mut self, chunks: impl IntoIterator<Item = StreamingChatMessage>) {
        for chunk in chunks {
            self.push(chunk);
        }
    }

    /// Accumulated content for a choice
    pub fn content(&self, choice_index: u32) -> Option<&str> {
        self.choices
            .get(&choice_index)
            .map(|partial| partial.content.as_str())
    }

    /// Complete messages ordered by choice index
    ///
    /// Choices that never reported a role are treated as assistant output.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.choices
            .into_iter()
            .map(|(index, partial)| {
                let mut message = ChatMessage::new(partial.role.unwrap_or(Role::Assistant))
                    .with_content(partial.content)
                    .with_choice_index(index);
                message.model_id = partial.model_id;
                if !partial.metadata.is_empty() {
                    message.metadata = Some(partial.metadata);
                }
                message
            })
            .collect()
    }
}
