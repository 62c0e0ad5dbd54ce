//! LLM provider clients implementing [`Llm`](crate::port::outbound::llm::Llm).

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::Anthropic;
pub use gemini::Gemini;
pub use openai::OpenAi;

use crate::error::{ConfigError, Error, Result};

/// Generation settings shared by every provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f64,
}

/// Read a provider API key from the environment.
///
/// Blank values count as missing.
fn api_key(var: &'static str) -> Result<String> {
    std::env::var(var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or(Error::Config(ConfigError::MissingField { field: var }))
}
