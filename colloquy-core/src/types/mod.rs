//! Core types used throughout the Colloquy library

pub mod history;
pub mod message;
pub mod settings;
pub mod stream;

/// A model identifier (e.g., "gpt-4o")
pub type ModelId = String;
