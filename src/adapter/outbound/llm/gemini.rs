//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{api_key, CompletionSettings};
use crate::error::{Error, Result};
use crate::port::outbound::llm::Llm;

const API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Google Gemini `generateContent` client.
#[derive(Debug)]
pub struct Gemini {
    client: Client,
    api_key: String,
    settings: CompletionSettings,
}

impl Gemini {
    /// Create a client with the given key and completion settings.
    #[must_use]
    pub fn new(client: Client, api_key: impl Into<String>, settings: CompletionSettings) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            settings,
        }
    }

    /// Build a client keyed from [`API_KEY_VAR`].
    ///
    /// # Errors
    ///
    /// Returns a missing-field config error when the key is unset.
    pub fn from_env(client: Client, settings: CompletionSettings) -> Result<Self> {
        Ok(Self::new(client, api_key(API_KEY_VAR)?, settings))
    }

    fn url(&self) -> String {
        format!("{API_ROOT}/{}:generateContent", self.settings.model)
    }

    fn request<'a>(&self, prompt: &'a str) -> Request<'a> {
        Request {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_tokens,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f64,
    max_output_tokens: usize,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl Response {
    fn text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[async_trait]
impl Llm for Gemini {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<Response>()
            .await?;

        response
            .text()
            .ok_or_else(|| Error::Parse("gemini response has no candidate text".into()))
    }
}
