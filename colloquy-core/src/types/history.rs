//! Ordered conversation transcripts

use crate::types::message::ChatMessage;
use serde::{Deserialize, Serialize};

/// An ordered conversation transcript
///
/// Insertion order is conversation order. Messages can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that starts with a system message
    pub fn with_system_message(text: impl Into<String>) -> Self {
        let mut history = Self::new();
        history.add_system_message(text);
        history
    }

    /// Append a message
    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a system message
    pub fn add_system_message(&mut self, text: impl Into<String>) {
        self.add_message(ChatMessage::system(text));
    }

    /// Append a user message
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.add_message(ChatMessage::user(text));
    }

    /// Append an assistant message
    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.add_message(ChatMessage::assistant(text));
    }

    /// Append a tool result linked to its originating call
    pub fn add_tool_message(
        &mut self,
        text: impl Into<String>,
        tool_call_id: impl Into<String>,
        function_name: impl Into<String>,
    ) {
        self.add_message(ChatMessage::tool_result(text, tool_call_id, function_name));
    }

    /// The messages in conversation order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Iterate over the messages in conversation order
    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history has no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<ChatMessage>> for ChatHistory {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

impl FromIterator<ChatMessage> for ChatHistory {
    fn from_iter<I: IntoIterator<Item = ChatMessage>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl Extend<ChatMessage> for ChatHistory {
    fn extend<I: IntoIterator<Item = ChatMessage>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
