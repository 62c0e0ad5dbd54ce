//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{api_key, CompletionSettings};
use crate::error::{Error, Result};
use crate::port::outbound::llm::Llm;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Anthropic Messages API client.
#[derive(Debug)]
pub struct Anthropic {
    client: Client,
    api_key: String,
    settings: CompletionSettings,
}

impl Anthropic {
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

    fn request<'a>(&'a self, prompt: &'a str) -> Request<'a> {
        Request {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: usize,
    temperature: f64,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl Response {
    fn text(self) -> String {
        self.content.into_iter().map(|c| c.text).collect()
    }
}

#[async_trait]
impl Llm for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request(prompt))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<Response>()
            .await?;

        Ok(response.text())
    }
}
