//! LLM client abstraction.
//!
//! Chat completion is an opaque capability here: given a prompt, return
//! text. Only the critic's reflection uses it.

use crate::types::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Text-in, text-out chat model.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Single user turn, no system prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model identifier, recorded in reflection events.
    fn model_name(&self) -> &str;
}

/// Which backend a chat client talks to.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Any OpenAI-compatible chat completions API (OpenAI, OpenRouter, Ollama's `/v1`).
    ///
    /// ```rust,ignore
    /// let client = Provider::OpenAI {
    ///     api_key: std::env::var("OPENAI_API_KEY")?,
    ///     api_base: "https://api.openai.com/v1".into(),
    ///     model: "gpt-4o-mini".into(),
    /// }
    /// .create_client(Duration::from_secs(60))?;
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },
}

impl Provider {
    /// Build the client; `timeout` bounds each request.
    pub fn create_client(&self, timeout: Duration) -> Result<Box<dyn LLMClient>> {
        let client = match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => super::openai::OpenAIChatClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                timeout,
            )?,
        };
        tracing::debug!(provider = self.name(), model = client.model_name(), "Created chat client");
        Ok(Box::new(client))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "openai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai(model: &str) -> Provider {
        Provider::OpenAI {
            api_key: "test".to_string(),
            api_base: "http://localhost:9/v1".to_string(),
            model: model.to_string(),
        }
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(openai("gpt-4o-mini").name(), "openai");
    }

    #[test]
    fn test_create_client_keeps_model() {
        let client = match openai("gpt-4o-mini").create_client(Duration::from_secs(5)) {
            Ok(client) => client,
            Err(e) => panic!("Expected client, got {}", e),
        };
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }
}
