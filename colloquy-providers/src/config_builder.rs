//! Configuration builders for provider configs

use crate::constants::*;
use crate::openai::OpenAIConfig;

/// Builder for OpenAI configuration
pub struct OpenAIConfigBuilder {
    api_key: String,
    base_url: Option<String>,
    organization_id: Option<String>,
    model: Option<String>,
    service_id: Option<String>,
}

impl OpenAIConfigBuilder {
    /// Create a new builder with required API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            organization_id: None,
            model: None,
            service_id: None,
        }
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the organization ID
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization_id = Some(org.into());
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the service id
    pub fn service_id(mut self, id: impl Into<String>) -> Self {
        self.service_id = Some(id.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> OpenAIConfig {
        OpenAIConfig {
            api_key: self.api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
            organization_id: self.organization_id,
            model_id: self
                .model
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            service_id: self.service_id,
        }
    }
}
