//! Constants for provider implementations

use std::time::Duration;

/// Provider name reported in OpenAI inference failures
pub const OPENAI_PROVIDER: &str = "openai";

/// Default OpenAI base URL
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default OpenAI model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the OpenAI base URL
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Environment variable overriding the OpenAI model
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";

/// Overall timeout applied by the default HTTP client
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Request body keys an adapter owns and callers may not override
pub const RESERVED_BODY_KEYS: &[&str] = &["model", "messages", "stream"];
