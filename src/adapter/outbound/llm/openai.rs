//! OpenAI Chat Completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{api_key, CompletionSettings};
use crate::error::{Error, Result};
use crate::port::outbound::llm::Llm;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI Chat Completions client.
#[derive(Debug)]
pub struct OpenAi {
    client: Client,
    api_key: String,
    settings: CompletionSettings,
}

impl OpenAi {
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
            response_format: ResponseFormat {
                kind: "json_object",
            },
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
    response_format: ResponseFormat,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl Response {
    fn text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
    }
}

#[async_trait]
impl Llm for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<Response>()
            .await?;

        response
            .text()
            .ok_or_else(|| Error::Parse("openai response has no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAi {
        OpenAi::new(
            Client::new(),
            "test-key",
            CompletionSettings {
                model: "gpt-4o-mini".into(),
                max_tokens: 256,
                temperature: 0.0,
            },
        )
    }

    #[test]
    fn request_asks_for_json_object() {
        let client = client();
        let json = serde_json::to_value(client.request("assess")).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["content"], "assess");
    }

    #[test]
    fn first_choice_is_returned() {
        let response: Response = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}, {"message": {"content": "no"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("ok"));
    }

    #[test]
    fn empty_choices_yield_nothing() {
        let response: Response = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.text().is_none());
    }
}
