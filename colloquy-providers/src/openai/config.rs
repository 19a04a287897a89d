//! OpenAI provider configuration

use crate::constants::{
    OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV, OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL,
    OPENAI_MODEL_ENV,
};
use colloquy_core::Error;

/// Configuration for the OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL for the API, without the trailing endpoint path
    pub base_url: String,
    /// Optional organization ID
    pub organization_id: Option<String>,
    /// Model to request
    pub model_id: String,
    /// Service id reported to the orchestrator; defaults to the model id
    pub service_id: Option<String>,
}

impl OpenAIConfig {
    /// Create a new configuration with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_DEFAULT_BASE_URL.to_string(),
            organization_id: None,
            model_id: OPENAI_DEFAULT_MODEL.to_string(),
            service_id: None,
        }
    }

    /// Create a new configuration builder
    pub fn builder(api_key: impl Into<String>) -> crate::config_builder::OpenAIConfigBuilder {
        crate::config_builder::OpenAIConfigBuilder::new(api_key)
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_MODEL` from the environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup
    ///
    /// The API key is required; the other values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let api_key = lookup(OPENAI_API_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Configuration(format!("{} is not set", OPENAI_API_KEY_ENV)))?;

        let mut builder = Self::builder(api_key);
        if let Some(url) = lookup(OPENAI_BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        if let Some(model) = lookup(OPENAI_MODEL_ENV) {
            builder = builder.model(model);
        }
        Ok(builder.build())
    }

    /// Set a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the organization ID
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization_id = Some(org.into());
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_id = model.into();
        self
    }

    /// Get the URL for chat completions
    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
