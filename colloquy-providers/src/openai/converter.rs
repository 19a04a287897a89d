//! Request conversion for OpenAI

use crate::constants::RESERVED_BODY_KEYS;
use crate::traits::{ChatRequest, RequestConverter};
use colloquy_core::Error;
use serde_json::{json, Map, Value};
use tracing::warn;

/// Converts normalized requests to OpenAI format
///
/// The message list is the normalized history as is. Settings
/// `extension_data` and option `extensions` are merged into the top level of
/// the body, options last, so per-call values win.
#[derive(Debug, Clone, Copy)]
pub struct OpenAIConverter;

impl RequestConverter for OpenAIConverter {
    fn convert_request(&self, request: ChatRequest<'_>) -> Result<Value, Error> {
        let mut body = Map::new();
        body.insert("model".into(), json!(request.model));
        body.insert("messages".into(), serde_json::to_value(request.messages)?);
        body.insert("stream".into(), json!(request.stream));

        merge_passthrough(&mut body, &request.settings.extension_data);

        if let Some(user) = &request.options.user {
            body.insert("user".into(), json!(user));
        }
        merge_passthrough(&mut body, &request.options.extensions);

        Ok(Value::Object(body))
    }
}

fn merge_passthrough(body: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        if RESERVED_BODY_KEYS.contains(&key.as_str()) {
            warn!(key = %key, "Ignoring passthrough value for a reserved request key");
            continue;
        }
        body.insert(key.clone(), value.clone());
    }
}
