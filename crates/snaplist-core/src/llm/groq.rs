//! Groq LLM provider (OpenAI-compatible API).
//!
//! Groq serves the naming and listing models. It speaks the Chat Completions
//! format, so this delegates to `OpenAiProvider` with Groq's base URL.

use super::openai::OpenAiProvider;
use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::time::Duration;

/// Groq provider wrapping an OpenAI-compatible endpoint.
pub struct GroqProvider {
    inner: OpenAiProvider,
}

impl GroqProvider {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            // Reasoning models emit long hidden preambles
            inner: OpenAiProvider::compatible(
                "groq",
                base_url,
                api_key,
                model,
                Duration::from_secs(90),
            ),
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
        self.inner.generate(request).await
    }

    fn timeout(&self) -> Duration {
        self.inner.timeout()
    }
}
