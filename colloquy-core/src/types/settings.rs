//! Settings and per-call options passed through to adapters

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Generation settings for a completion request
///
/// The core treats this as opaque and hands it to the adapter unchanged.
/// Adapters decide which `extension_data` keys they understand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Service the settings are meant for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Provider parameters such as `temperature` or `max_tokens`
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extension_data: Map<String, Value>,
}

impl ExecutionSettings {
    /// Create empty settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a specific service
    pub fn for_service(service_id: impl Into<String>) -> Self {
        Self {
            service_id: Some(service_id.into()),
            ..Self::default()
        }
    }

    /// Set a provider parameter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extension_data.insert(key.into(), value.into());
        self
    }

    /// Look up a provider parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extension_data.get(key)
    }
}

/// Per-call options for a completion request
///
/// `timeout` and `user` are understood by every adapter in this workspace.
/// Anything else goes in `extensions` and is documented by the adapter that
/// reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    /// Deadline for the whole call (for streams, for the initial response)
    pub timeout: Option<Duration>,
    /// End-user identifier forwarded to the provider
    pub user: Option<String>,
    /// Provider-specific passthrough values
    pub extensions: Map<String, Value>,
}

impl CompletionOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the call deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the end-user identifier
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Add a provider-specific passthrough value
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}
