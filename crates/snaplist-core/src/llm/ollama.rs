//! Local backend speaking Ollama's `/api/generate`.
//!
//! One non-streaming call per request. Vision requests carry the photo as the
//! single entry of `images`; text requests leave the key out entirely.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Local vision models on CPU can take minutes per photo.
const LOCAL_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OllamaProvider {
    generate_url: String,
    tags_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, model: &str) -> Self {
        let base = endpoint.trim_end_matches('/');
        Self {
            generate_url: format!("{base}/api/generate"),
            tags_url: format!("{base}/api/tags"),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_body<'a>(&'a self, request: &'a LlmRequest) -> GenerateBody<'a> {
        GenerateBody {
            model: &self.model,
            prompt: &request.prompt,
            images: request.image.as_ref().map(|image| [image.data.as_str()]),
            stream: false,
            options: SamplingOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }

    async fn send(&self, body: &GenerateBody<'_>) -> Result<GenerateReply, ProviderError> {
        let resp = self
            .client
            .post(&self.generate_url)
            .json(body)
            .timeout(LOCAL_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::Request {
                message: format!("ollama at {} unreachable: {e}", self.generate_url),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Request {
                message: format!("ollama HTTP {status}: {detail}"),
                status_code: Some(status.as_u16()),
            });
        }

        resp.json().await.map_err(|e| ProviderError::Request {
            message: format!("ollama returned an unreadable body: {e}"),
            status_code: None,
        })
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<[&'a str; 1]>,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    model: Option<String>,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl GenerateReply {
    /// Prompt plus completion tokens; absent when Ollama skipped the counters.
    fn tokens_used(&self) -> Option<u32> {
        match (self.prompt_eval_count, self.eval_count) {
            (None, None) => None,
            (prompt, completion) => {
                Some(prompt.unwrap_or(0).saturating_add(completion.unwrap_or(0)))
            }
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(&self.tags_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
        let start = Instant::now();
        let reply = self.send(&self.build_body(request)).await?;

        let tokens_used = reply.tokens_used();
        let text = reply.response.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: "ollama".to_string(),
            });
        }

        Ok(LlmResponse {
            text: text.to_string(),
            model: reply.model.unwrap_or_else(|| self.model.clone()),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        LOCAL_TIMEOUT
    }
}
