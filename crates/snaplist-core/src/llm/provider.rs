//! LLM provider trait and request/response types.
//!
//! Defines the interface that all backends implement, the role-specific
//! prompts, and the factory that builds a backend from a configured route.

use crate::config::{LlmConfig, ModelRoute};
use crate::error::ProviderError;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and a MIME type.
    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A single generation request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Attached image, for vision requests
    pub image: Option<ImageInput>,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    /// Ask for a detailed, resale-oriented description of the pictured item.
    pub fn describe_item(image: ImageInput) -> Self {
        Self {
            image: Some(image),
            prompt: "Please describe this image in as much detail as possible for an online \
                     product listing. Name the primary item and, where you can tell, its brand \
                     or model, material, colour, size, visible condition or wear, and any \
                     included accessories or packaging. Answer in a few plain sentences."
                .to_string(),
            max_tokens: 300,
            temperature: 0.0,
        }
    }

    /// Ask for a short snake_case file stem.
    pub fn suggest_name(description: &str) -> Self {
        Self {
            image: None,
            prompt: format!(
                "Create a concise snake_case file stem (at most 5 words, lowercase, no spaces, \
                 no file extension) for the item below. Reply with the stem only.\n\
                 Item: {description}"
            ),
            max_tokens: 32,
            temperature: 0.2,
        }
    }

    /// Ask for a marketplace listing as a bare JSON object.
    pub fn marketplace_listing(description: &str, condition: &str) -> Self {
        Self {
            image: None,
            prompt: format!(
                "Respond ONLY with valid JSON.\n\
                 Create a Facebook Marketplace listing for the item below.\n\
                 Item description: {description}\n\
                 Condition: \"{condition}\".\n\
                 Return a single JSON object with exactly two string keys: title, description."
            ),
            max_tokens: 2048,
            temperature: 0.2,
        }
    }

    /// Apply the sampling settings of a configured route.
    pub fn with_route(mut self, route: &ModelRoute) -> Self {
        self.max_tokens = route.max_tokens;
        self.temperature = route.temperature;
        self
    }
}

/// The response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate text for the given request.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the backend serving a route.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the backend named by `route.provider` for `route.model`.
    pub fn create(
        route: &ModelRoute,
        config: &LlmConfig,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        let model = route.model.as_str();
        match route.provider.as_str() {
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ProviderError::NotConfigured(
                        "OpenAI API key not set. Set OPENAI_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    model,
                )))
            }
            "groq" => {
                let cfg = config.groq.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ProviderError::NotConfigured(
                        "Groq API key not set. Set GROQ_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::groq::GroqProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    model,
                )))
            }
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    model,
                )))
            }
            other => Err(ProviderError::NotConfigured(format!(
                "Unknown LLM provider: {other}"
            ))),
        }
    }
}
