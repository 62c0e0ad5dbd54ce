//! LLM provider configuration.
//!
//! Selects the model behind the risk assessor. API keys are read from the
//! environment (`GEMINI_API_KEY`, `ANTHROPIC_API_KEY` or `OPENAI_API_KEY`)
//! at startup.

use serde::Deserialize;

use crate::adapter::outbound::llm::{anthropic, gemini, openai, CompletionSettings};

/// `[llm]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Defaults to Gemini.
    #[serde(default)]
    pub provider: LlmProvider,

    #[serde(default = "ModelConfig::gemini")]
    pub gemini: ModelConfig,

    #[serde(default = "ModelConfig::anthropic")]
    pub anthropic: ModelConfig,

    #[serde(default = "ModelConfig::openai")]
    pub openai: ModelConfig,
}

/// LLM provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Anthropic,
    OpenAi,
}

impl LlmProvider {
    /// Environment variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Gemini => gemini::API_KEY_VAR,
            Self::Anthropic => anthropic::API_KEY_VAR,
            Self::OpenAi => openai::API_KEY_VAR,
        }
    }
}

/// Per-provider generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub model: String,

    /// Sampling temperature. Low values keep scores reproducible.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl ModelConfig {
    fn with_model(model: &str) -> Self {
        Self {
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    fn gemini() -> Self {
        Self::with_model("gemini-2.0-flash")
    }

    fn anthropic() -> Self {
        Self::with_model("claude-3-5-sonnet-20241022")
    }

    fn openai() -> Self {
        Self::with_model("gpt-4o")
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            gemini: ModelConfig::gemini(),
            anthropic: ModelConfig::anthropic(),
            openai: ModelConfig::openai(),
        }
    }
}

impl LlmConfig {
    /// Generation settings of the selected provider.
    #[must_use]
    pub fn completion_settings(&self) -> CompletionSettings {
        let model = match self.provider {
            LlmProvider::Gemini => &self.gemini,
            LlmProvider::Anthropic => &self.anthropic,
            LlmProvider::OpenAi => &self.openai,
        };
        CompletionSettings {
            model: model.model.clone(),
            max_tokens: model.max_tokens,
            temperature: model.temperature,
        }
    }
}

fn default_temperature() -> f64 {
    0.2
}

const fn default_max_tokens() -> usize {
    1024
}
