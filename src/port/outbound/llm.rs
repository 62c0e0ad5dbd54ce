//! LLM completion port used by the risk assessor.

use async_trait::async_trait;

use crate::error::Result;

/// Client for large language model text completion.
///
/// Implementations wrap a specific provider and handle authentication and
/// response unwrapping. Must be `Send + Sync` so the assessor can be shared
/// across per-asset cycles.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Send a completion request and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is invalid.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
