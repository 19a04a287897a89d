//! OpenAI provider implementation

mod config;
mod converter;
mod parser;
mod provider;
mod stream;

#[cfg(test)]
mod tests;

pub use config::OpenAIConfig;
pub use converter::OpenAIConverter;
pub use parser::{OpenAIParser, DONE_MARKER};
pub use provider::OpenAI;
pub use stream::OpenAIStream;
