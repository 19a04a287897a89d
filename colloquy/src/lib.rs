//! Colloquy - chat history normalization and a uniform chat completion contract
//!
//! A [`ChatHistory`] holds role-tagged [`ChatMessage`]s. Before any backend
//! sees it, the history is flattened by [`normalize`] into a list of
//! [`NormalizedRecord`]s whose shape depends on each message's role: tool
//! results carry their `tool_call_id` and function `name`, every other role
//! drops its bookkeeping fields. Backends implement [`ChatCompletionClient`]
//! to turn that payload into batch or streamed replies.
//!
//! # Quick Start
//!
//! ```no_run
//! # use colloquy::prelude::*;
//! # #[cfg(feature = "providers")]
//! # use colloquy::providers::OpenAI;
//! #
//! # #[tokio::main]
//! # async fn main() -> Result<(), colloquy::Error> {
//! #     #[cfg(feature = "providers")]
//! #     {
//!     let client = OpenAI::with_api_key("your-api-key")?;
//!
//!     let mut history = ChatHistory::with_system_message("You are terse.");
//!     history.add_user_message("Hello!");
//!
//!     let replies = client
//!         .complete_chat(&history, &ExecutionSettings::new(), &CompletionOptions::new())
//!         .await?;
//!     println!("{}", replies[0].content.as_deref().unwrap_or_default());
//! #     }
//! #     Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export core types
pub use colloquy_core::*;

#[cfg(feature = "providers")]
#[cfg_attr(docsrs, doc(cfg(feature = "providers")))]
pub mod providers {
    //! Backend adapters
    pub use colloquy_providers::*;
}

/// Prelude module for convenient imports
pub mod prelude {

    pub use colloquy_core::{
        normalize, AiServiceClient, ChatCompletionClient, ChatHistory, ChatMessage,
        CompletionOptions, Error, ExecutionSettings, InferenceErrorKind, NormalizedRecord, Role,
        StreamAccumulator, StreamingChatMessage,
    };

    #[cfg(feature = "providers")]
    pub use colloquy_providers::openai::OpenAIConfig;
}
