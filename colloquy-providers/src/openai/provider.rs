//! OpenAI provider implementation
//!
//! This module provides a [`ChatCompletionClient`] for OpenAI's chat
//! completions endpoint and any server that speaks the same protocol
//! (vLLM, llama.cpp, LM Studio, Azure deployments behind a proxy).
//!
//! Recognized [`CompletionOptions`]: `timeout` bounds the whole batch call,
//! or the wait for response headers when streaming; `user` is sent as the
//! `user` body field; every `extensions` entry is merged into the top level
//! of the request body.

use crate::constants::OPENAI_PROVIDER;
use crate::http::{create_headers, HttpClient, ReqwestClient};
use crate::openai::{
    config::OpenAIConfig, converter::OpenAIConverter, parser::OpenAIParser, stream::OpenAIStream,
};
use crate::traits::{ChatRequest, RequestConverter, ResponseParser};
use crate::utils::with_deadline;
use async_trait::async_trait;
use colloquy_core::{
    AiServiceClient, ChatCompletionClient, ChatHistory, ChatMessage, CompletionOptions, Error,
    ExecutionSettings, ServiceInfo,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// OpenAI-compatible chat completion client
///
/// # Example
///
/// ```no_run
/// use colloquy_core::{ChatCompletionClient, ChatHistory, CompletionOptions, ExecutionSettings};
/// use colloquy_providers::OpenAI;
///
/// # async fn example() -> Result<(), colloquy_core::Error> {
/// let client = OpenAI::with_api_key("your-api-key")?;
///
/// let mut history = ChatHistory::with_system_message("Answer in one word.");
/// history.add_user_message("Capital of France?");
///
/// let replies = client
///     .complete_chat(&history, &ExecutionSettings::new(), &CompletionOptions::new())
///     .await?;
/// println!("{:?}", replies[0].content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenAI {
    client: Arc<dyn HttpClient>,
    config: OpenAIConfig,
    info: ServiceInfo,
    converter: OpenAIConverter,
    parser: OpenAIParser,
}

impl OpenAI {
    /// Create a new OpenAI provider with the given configuration and client
    pub fn new(config: OpenAIConfig, client: Arc<dyn HttpClient>) -> Self {
        let info = match &config.service_id {
            Some(service_id) => ServiceInfo::with_service_id(config.model_id.clone(), service_id.clone()),
            None => ServiceInfo::new(config.model_id.clone()),
        };
        Self {
            client,
            config,
            info,
            converter: OpenAIConverter,
            parser: OpenAIParser,
        }
    }

    /// Create a new OpenAI provider with just an API key
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, Error> {
        let client = Arc::new(ReqwestClient::new()?);
        Ok(Self::new(OpenAIConfig::new(api_key), client))
    }

    /// Create a provider configured from the environment
    pub fn from_env() -> Result<Self, Error> {
        let client = Arc::new(ReqwestClient::new()?);
        Ok(Self::new(OpenAIConfig::from_env()?, client))
    }

    /// The active configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn headers(&self) -> Result<HeaderMap, Error> {
        let additional = match &self.config.organization_id {
            Some(org) => {
                let mut extra = HeaderMap::new();
                extra.insert(
                    HeaderName::from_static("openai-organization"),
                    HeaderValue::from_str(org)
                        .map_err(|e| Error::Configuration(format!("Invalid organization: {}", e)))?,
                );
                Some(extra)
            }
            None => None,
        };
        create_headers(&self.config.api_key, additional)
    }

    fn build_body(
        &self,
        history: &ChatHistory,
        settings: &ExecutionSettings,
        options: &CompletionOptions,
        stream: bool,
    ) -> Result<Value, Error> {
        let messages = self.prepare_chat_history(history);
        self.converter.convert_request(ChatRequest {
            model: self.model_id(),
            messages: &messages,
            settings,
            options,
            stream,
        })
    }
}

impl AiServiceClient for OpenAI {
    fn service_info(&self) -> &ServiceInfo {
        &self.info
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAI {
    type Stream = OpenAIStream;

    async fn complete_chat(
        &self,
        history: &ChatHistory,
        settings: &ExecutionSettings,
        options: &CompletionOptions,
    ) -> Result<Vec<ChatMessage>, Error> {
        let body = self.build_body(history, settings, options, false)?;
        let headers = self.headers()?;
        debug!(
            provider = OPENAI_PROVIDER,
            model = self.model_id(),
            messages = history.len(),
            "Sending chat completion request"
        );

        let url = self.config.chat_url();
        let response = with_deadline(
            OPENAI_PROVIDER,
            options.timeout,
            self.client.post(&url, headers, body),
        )
        .await?;

        let messages = self.parser.parse_response(response)?;
        debug!(
            provider = OPENAI_PROVIDER,
            choices = messages.len(),
            "Received chat completion response"
        );
        Ok(messages)
    }

    async fn complete_chat_stream(
        &self,
        history: &ChatHistory,
        settings: &ExecutionSettings,
        options: &CompletionOptions,
    ) -> Result<Self::Stream, Error> {
        let body = self.build_body(history, settings, options, true)?;
        let headers = self.headers()?;
        debug!(
            provider = OPENAI_PROVIDER,
            model = self.model_id(),
            messages = history.len(),
            "Opening chat completion stream"
        );

        let url = self.config.chat_url();
        let body_stream = with_deadline(
            OPENAI_PROVIDER,
            options.timeout,
            self.client.post_stream(&url, headers, body),
        )
        .await?;

        Ok(OpenAIStream::new(body_stream))
    }
}
