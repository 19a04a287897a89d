//! Backend adapters for the Colloquy chat completion contract
//!
//! Adapters take their message payload from the core normalizer and map
//! every transport or provider failure onto
//! [`Error::Inference`](colloquy_core::Error::Inference).

pub mod builder;
pub mod config_builder;
pub mod constants;
pub mod error;
pub mod http;
pub mod traits;
pub mod utils;

// Provider implementations
pub mod openai;

// Re-export provider types
pub use openai::OpenAI;

// Re-export common traits
pub use builder::ProviderBuilder;
pub use traits::{ChatRequest, RequestConverter, ResponseParser, StreamEventParser};
