//! Builder pattern for provider construction
//!
//! Builders collect configuration through chained setters and finish with
//! `build()`. Every builder accepts a custom [`HttpClient`], which is how
//! tests and special networking setups plug in.
//!
//! # Examples
//!
//! ```no_run
//! use colloquy_providers::builder::{OpenAIBuilder, ProviderBuilder};
//!
//! let provider = OpenAIBuilder::new("api-key")
//!     .base_url("http://localhost:8000/v1")
//!     .model("llama-3.1-8b-instruct")
//!     .service_id("local")
//!     .build()
//!     .expect("Failed to build provider");
//! ```

use crate::config_builder::OpenAIConfigBuilder;
use crate::http::{HttpClient, ReqwestClient};
use crate::openai::OpenAI;
use colloquy_core::Error;
use std::sync::Arc;

/// Common builder trait for all providers
pub trait ProviderBuilder: Sized {
    /// The provider type being built
    type Provider;

    /// Set a custom HTTP client
    fn with_client(self, client: Arc<dyn HttpClient>) -> Self;

    /// Build the provider
    fn build(self) -> Result<Self::Provider, Error>;
}

/// Builder for constructing OpenAI providers
pub struct OpenAIBuilder {
    config: OpenAIConfigBuilder,
    client: Option<Arc<dyn HttpClient>>,
}

impl OpenAIBuilder {
    /// Create a new OpenAI builder with API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: OpenAIConfigBuilder::new(api_key),
            client: None,
        }
    }

    /// Set the base URL (for compatible servers and proxies)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.base_url(url);
        self
    }

    /// Set the organization ID
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.config = self.config.organization(org);
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config = self.config.model(model);
        self
    }

    /// Set the service id
    pub fn service_id(mut self, id: impl Into<String>) -> Self {
        self.config = self.config.service_id(id);
        self
    }
}

impl ProviderBuilder for OpenAIBuilder {
    type Provider = OpenAI;

    fn with_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    fn build(self) -> Result<Self::Provider, Error> {
        let client: Arc<dyn HttpClient> = match self.client {
            Some(client) => client,
            None => Arc::new(ReqwestClient::new()?),
        };
        Ok(OpenAI::new(self.config.build(), client))
    }
}
