//! Chat history normalization
//!
//! Turns a [`ChatHistory`] into the flat, wire-ready records that adapters
//! place in the message list of a provider request. The transformation is
//! pure: it reads the history, allocates fresh records, and has no error
//! path. [`normalize_strict`] adds opt-in validation of tool-call linkage.
//!
//! Rules per role:
//!
//! - `system`, `user`, `assistant`: every non-null field except `metadata`,
//!   `encoding`, `model_id`, `inner_content` and `choice_index`.
//! - `tool`: every non-null field except `encoding`. When the metadata holds
//!   a `tool_call_id`, it is promoted to a top-level `tool_call_id`, the
//!   metadata `function_name` becomes `name`, and `metadata` is dropped.
//!   Without a `tool_call_id` the metadata is kept as is.

use crate::error::NormalizationError;
use crate::types::history::ChatHistory;
use crate::types::message::{ChatMessage, Role, FUNCTION_NAME_KEY, TOOL_CALL_ID_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record key for the promoted tool call id
pub const RECORD_TOOL_CALL_ID: &str = "tool_call_id";

/// Record key for the author or function name
pub const RECORD_NAME: &str = "name";

/// A message field as it appears in a normalized record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageField {
    Role,
    Content,
    Name,
    ModelId,
    InnerContent,
    Encoding,
    ChoiceIndex,
    Metadata,
}

impl MessageField {
    const ALL: [MessageField; 8] = [
        MessageField::Role,
        MessageField::Content,
        MessageField::Name,
        MessageField::ModelId,
        MessageField::InnerContent,
        MessageField::Encoding,
        MessageField::ChoiceIndex,
        MessageField::Metadata,
    ];

    fn key(self) -> &'static str {
        match self {
            MessageField::Role => "role",
            MessageField::Content => "content",
            MessageField::Name => RECORD_NAME,
            MessageField::ModelId => "model_id",
            MessageField::InnerContent => "inner_content",
            MessageField::Encoding => "encoding",
            MessageField::ChoiceIndex => "choice_index",
            MessageField::Metadata => "metadata",
        }
    }

    fn value(self, message: &ChatMessage) -> Option<Value> {
        let value = match self {
            MessageField::Role => Value::String(message.role().as_str().to_string()),
            MessageField::Content => Value::String(message.content.clone()?),
            MessageField::Name => Value::String(message.name.clone()?),
            MessageField::ModelId => Value::String(message.model_id.clone()?),
            MessageField::InnerContent => message.inner_content.clone()?,
            MessageField::Encoding => Value::String(message.encoding.clone()?),
            MessageField::ChoiceIndex => Value::from(message.choice_index?),
            MessageField::Metadata => Value::Object(message.metadata.clone()?),
        };
        (!value.is_null()).then_some(value)
    }
}

const TOOL_EXCLUDED: &[MessageField] = &[MessageField::Encoding];

const CONVERSATION_EXCLUDED: &[MessageField] = &[
    MessageField::Metadata,
    MessageField::Encoding,
    MessageField::ModelId,
    MessageField::InnerContent,
    MessageField::ChoiceIndex,
];

/// A provider-ready message record
///
/// Serializes as a plain JSON object. Holds no reference to the message it
/// was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord(Map<String, Value>);

impl NormalizedRecord {
    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Whether the record has a field
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Field names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying map
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<NormalizedRecord> for Value {
    fn from(record: NormalizedRecord) -> Self {
        Value::Object(record.0)
    }
}

/// Normalize a whole history, one record per message, in order
pub fn normalize(history: &ChatHistory) -> Vec<NormalizedRecord> {
    history.iter().map(normalize_message).collect()
}

/// Normalize a history, rejecting tool messages with broken linkage
///
/// A tool message must carry string `tool_call_id` and `function_name`
/// metadata values. Other roles are never rejected.
pub fn normalize_strict(history: &ChatHistory) -> Result<Vec<NormalizedRecord>, NormalizationError> {
    history
        .iter()
        .enumerate()
        .map(|(index, message)| {
            if message.role() == Role::Tool {
                check_tool_linkage(index, message)?;
            }
            Ok(normalize_message(message))
        })
        .collect()
}

/// Normalize a single message
pub fn normalize_message(message: &ChatMessage) -> NormalizedRecord {
    match message.role() {
        Role::Tool => {
            let mut record = dump(message, TOOL_EXCLUDED);
            promote_tool_linkage(&mut record);
            NormalizedRecord(record)
        }
        Role::System | Role::User | Role::Assistant => {
            NormalizedRecord(dump(message, CONVERSATION_EXCLUDED))
        }
    }
}

fn dump(message: &ChatMessage, excluded: &[MessageField]) -> Map<String, Value> {
    MessageField::ALL
        .into_iter()
        .filter(|field| !excluded.contains(field))
        .filter_map(|field| Some((field.key().to_string(), field.value(message)?)))
        .collect()
}

fn promote_tool_linkage(record: &mut Map<String, Value>) {
    let metadata_key = MessageField::Metadata.key();
    let Some(Value::Object(metadata)) = record.get(metadata_key) else {
        return;
    };
    let Some(call_id) = metadata.get(TOOL_CALL_ID_KEY).filter(|v| !v.is_null()).cloned() else {
        return;
    };
    let function_name = metadata
        .get(FUNCTION_NAME_KEY)
        .filter(|v| !v.is_null())
        .cloned();

    record.insert(RECORD_TOOL_CALL_ID.to_string(), call_id);
    if let Some(name) = function_name {
        record.insert(RECORD_NAME.to_string(), name);
    }
    record.remove(metadata_key);
}

fn check_tool_linkage(index: usize, message: &ChatMessage) -> Result<(), NormalizationError> {
    let metadata = message.metadata.as_ref();
    match metadata.and_then(|m| m.get(TOOL_CALL_ID_KEY)) {
        None | Some(Value::Null) => return Err(NormalizationError::MissingToolCallId { index }),
        Some(Value::String(_)) => {}
        Some(_) => {
            return Err(NormalizationError::InvalidMetadataValue {
                index,
                key: TOOL_CALL_ID_KEY,
            })
        }
    }
    match metadata.and_then(|m| m.get(FUNCTION_NAME_KEY)) {
        None | Some(Value::Null) => Err(NormalizationError::MissingFunctionName { index }),
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(NormalizationError::InvalidMetadataValue {
            index,
            key: FUNCTION_NAME_KEY,
        }),
    }
}
