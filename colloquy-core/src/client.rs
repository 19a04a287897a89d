//! The chat completion client contract
//!
//! Every backend adapter implements [`ChatCompletionClient`]. Adapters get
//! their message payload from [`ChatCompletionClient::prepare_chat_history`]
//! and never shape messages themselves, so one normalization serves every
//! provider.

use crate::error::Result;
use crate::normalize::{normalize, NormalizedRecord};
use crate::types::history::ChatHistory;
use crate::types::message::ChatMessage;
use crate::types::settings::{CompletionOptions, ExecutionSettings};
use crate::types::stream::StreamingChatMessage;
use crate::types::ModelId;
use async_trait::async_trait;
use futures_core::Stream;
use std::any::{type_name, TypeId};
use std::fmt;
use std::pin::Pin;

/// One stream increment: a chunk per choice the provider emitted
pub type StreamItem = Result<Vec<StreamingChatMessage>>;

/// Type-erased completion stream
pub type BoxChatStream = Pin<Box<dyn Stream<Item = StreamItem> + Send>>;

/// Immutable identity of a backend service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    model_id: ModelId,
    service_id: String,
}

impl ServiceInfo {
    /// Identity whose service id is the model id
    pub fn new(model_id: impl Into<ModelId>) -> Self {
        let model_id = model_id.into();
        Self {
            service_id: model_id.clone(),
            model_id,
        }
    }

    /// Identity with an explicit service id
    ///
    /// An empty service id falls back to the model id.
    pub fn with_service_id(model_id: impl Into<ModelId>, service_id: impl Into<String>) -> Self {
        let mut info = Self::new(model_id);
        let service_id = service_id.into();
        if !service_id.is_empty() {
            info.service_id = service_id;
        }
        info
    }

    /// Model served by this service
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Name the orchestrator uses to pick this service
    pub fn service_id(&self) -> &str {
        &self.service_id
    }
}

/// Base for anything that fronts an AI model
pub trait AiServiceClient: Send + Sync {
    /// Identity of this service
    fn service_info(&self) -> &ServiceInfo;

    /// Model served by this client
    fn model_id(&self) -> &str {
        self.service_info().model_id()
    }

    /// Service id of this client
    fn service_id(&self) -> &str {
        self.service_info().service_id()
    }
}

/// Descriptor of the message type a client produces
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// Descriptor for `T`
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Whether this describes `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageType").field(&self.name).finish()
    }
}

/// The interface every chat backend adapter implements
///
/// Implementations hold only immutable configuration, so concurrent calls on
/// one client are independent. Provider failures of any sort come back as
/// [`Error::Inference`](crate::Error::Inference).
#[async_trait]
pub trait ChatCompletionClient: AiServiceClient {
    /// The stream type returned by [`complete_chat_stream`](Self::complete_chat_stream)
    ///
    /// Dropping the stream must release the underlying connection.
    type Stream: Stream<Item = StreamItem> + Send + Unpin;

    /// Message type this client produces
    fn response_message_type(&self) -> MessageType {
        MessageType::of::<ChatMessage>()
    }

    /// Provider-ready message list for a request
    fn prepare_chat_history(&self, history: &ChatHistory) -> Vec<NormalizedRecord> {
        normalize(history)
    }

    /// Request a complete response
    ///
    /// Returns every choice the provider generated, in choice order.
    async fn complete_chat(
        &self,
        history: &ChatHistory,
        settings: &ExecutionSettings,
        options: &CompletionOptions,
    ) -> Result<Vec<ChatMessage>>;

    /// Request a streamed response
    ///
    /// Each item holds the chunks of one provider increment. The stream ends
    /// when the provider signals completion. A failure mid-stream arrives as
    /// an `Err` item; items already yielded stay valid.
    async fn complete_chat_stream(
        &self,
        history: &ChatHistory,
        settings: &ExecutionSettings,
        options: &CompletionOptions,
    ) -> Result<Self::Stream>;
}
