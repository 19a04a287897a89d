//! Response parsing for OpenAI

use crate::constants::OPENAI_PROVIDER;
use crate::error::{malformed_response, provider_reported};
use crate::traits::{ResponseParser, StreamEventParser};
use colloquy_core::{ChatMessage, Error, Metadata, Role, StreamingChatMessage};
use serde::Deserialize;
use serde_json::Value;

/// Stream payload that marks the end of an OpenAI stream
pub const DONE_MARKER: &str = "[DONE]";

/// Parses OpenAI responses
#[derive(Debug, Clone, Copy)]
pub struct OpenAIParser;

impl ResponseParser for OpenAIParser {
    fn parse_response(&self, value: Value) -> Result<Vec<ChatMessage>, Error> {
        check_error_object(&value)?;

        let response: OpenAIResponse = serde_json::from_value(value.clone())
            .map_err(|e| malformed_response(OPENAI_PROVIDER, e.to_string()))?;

        if response.choices.is_empty() {
            return Err(malformed_response(OPENAI_PROVIDER, "No choices in response"));
        }

        let mut messages: Vec<ChatMessage> = response
            .choices
            .into_iter()
            .map(|choice| {
                let mut metadata = Metadata::new();
                insert_opt(&mut metadata, "id", response.id.clone().map(Value::String));
                insert_opt(&mut metadata, "finish_reason", choice.finish_reason.map(Value::String));
                insert_opt(&mut metadata, "usage", response.usage.clone());
                insert_opt(&mut metadata, "tool_calls", choice.message.tool_calls);

                let mut message = ChatMessage::new(parse_role(choice.message.role.as_deref()))
                    .with_choice_index(choice.index)
                    .with_inner_content(value.clone())
                    .with_metadata(metadata);
                message.content = choice.message.content;
                message.model_id = response.model.clone();
                message
            })
            .collect();

        messages.sort_by_key(|m| m.choice_index);
        Ok(messages)
    }
}

impl StreamEventParser for OpenAIParser {
    fn parse_event(&self, data: &str) -> Result<Option<Vec<StreamingChatMessage>>, Error> {
        let value: Value = serde_json::from_str(data)
            .map_err(|e| malformed_response(OPENAI_PROVIDER, format!("Bad stream chunk: {}", e)))?;
        check_error_object(&value)?;

        let chunk: StreamChunk = serde_json::from_value(value.clone())
            .map_err(|e| malformed_response(OPENAI_PROVIDER, format!("Bad stream chunk: {}", e)))?;

        if chunk.choices.is_empty() {
            return Ok(None);
        }

        let chunks = chunk
            .choices
            .into_iter()
            .map(|choice| {
                let mut metadata = Metadata::new();
                insert_opt(&mut metadata, "finish_reason", choice.finish_reason.map(Value::String));
                insert_opt(&mut metadata, "tool_calls", choice.delta.tool_calls);

                StreamingChatMessage {
                    role: choice.delta.role.as_deref().map(|r| parse_role(Some(r))),
                    content: choice.delta.content,
                    choice_index: choice.index,
                    model_id: chunk.model.clone(),
                    inner_content: Some(value.clone()),
                    metadata: (!metadata.is_empty()).then_some(metadata),
                }
            })
            .collect();

        Ok(Some(chunks))
    }
}

fn check_error_object(value: &Value) -> Result<(), Error> {
    match value.get("error") {
        Some(error) if !error.is_null() => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown provider error");
            Err(provider_reported(OPENAI_PROVIDER, message))
        }
        _ => Ok(()),
    }
}

fn insert_opt(metadata: &mut Metadata, key: &str, value: Option<Value>) {
    if let Some(value) = value.filter(|v| !v.is_null()) {
        metadata.insert(key.to_string(), value);
    }
}

fn parse_role(role: Option<&str>) -> Role {
    match role {
        Some("system") | Some("developer") => Role::System,
        Some("user") => Role::User,
        Some("tool") => Role::Tool,
        _ => Role::Assistant,
    }
}

// Response structures
#[derive(Deserialize)]
struct OpenAIResponse {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Value>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    index: u32,
    message: MessageResponse,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct MessageResponse {
    role: Option<String>,
    content: Option<String>,
    tool_calls: Option<Value>,
}

// Streaming structures
#[derive(Deserialize)]
struct StreamChunk {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    delta: DeltaContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct DeltaContent {
    role: Option<String>,
    content: Option<String>,
    tool_calls: Option<Value>,
}
