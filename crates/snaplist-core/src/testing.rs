//! Test doubles shared by the unit tests.

use crate::error::ProviderError;
use crate::llm::{
    DescriptionProvider, ImageInput, ListingProvider, LlmProvider, LlmRequest, LlmResponse,
    NamingProvider,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type ResponseFn<T> = Box<dyn Fn(u32) -> Result<T, ProviderError> + Send + Sync>;

/// A configurable mock LLM backend.
///
/// Each call to `generate()` invokes the response factory with the current
/// call index, allowing callers to return different results per attempt.
pub(crate) struct MockLlm {
    response_fn: ResponseFn<String>,
    call_count: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
    delay: Option<Duration>,
    timeout: Duration,
}

impl MockLlm {
    fn with_fn(response_fn: ResponseFn<String>) -> Self {
        Self {
            response_fn,
            call_count: Arc::new(AtomicU32::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            timeout: Duration::from_millis(1),
        }
    }

    pub(crate) fn success(text: &str) -> Self {
        let text = text.to_string();
        Self::with_fn(Box::new(move |_| Ok(text.clone())))
    }

    pub(crate) fn failing(status_code: Option<u16>, message: &str) -> Self {
        let message = message.to_string();
        Self::with_fn(Box::new(move |_| {
            Err(ProviderError::Request {
                message: message.clone(),
                status_code,
            })
        }))
    }

    /// First call returns an error, subsequent calls succeed.
    pub(crate) fn fail_then_succeed(
        status_code: Option<u16>,
        error_msg: &str,
        success_text: &str,
    ) -> Self {
        let error_msg = error_msg.to_string();
        let success_text = success_text.to_string();
        Self::with_fn(Box::new(move |idx| {
            if idx == 0 {
                Err(ProviderError::Request {
                    message: error_msg.clone(),
                    status_code,
                })
            } else {
                Ok(success_text.clone())
            }
        }))
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Backend-reported timeout; tiny by default so the policy governs.
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn call_count_handle(&self) -> Arc<AtomicU32> {
        self.call_count.clone()
    }

    pub(crate) fn requests_handle(&self) -> Arc<Mutex<Vec<LlmRequest>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ProviderError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.response_fn)(idx).map(|text| LlmResponse {
            text,
            model: "mock-v1".to_string(),
            tokens_used: Some(42),
            latency_ms: 10,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Mock capability answering every role from one script.
pub(crate) struct MockCapability {
    response_fn: ResponseFn<String>,
    call_count: Arc<AtomicU32>,
    inputs: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    timeout: Duration,
}

impl MockCapability {
    pub(crate) fn ok(text: &str) -> Self {
        let text = text.to_string();
        Self::scripted(move |_| Ok(text.clone()))
    }

    pub(crate) fn err(status_code: Option<u16>, message: &str) -> Self {
        let message = message.to_string();
        Self::scripted(move |_| {
            Err(ProviderError::Request {
                message: message.clone(),
                status_code,
            })
        })
    }

    pub(crate) fn scripted(
        f: impl Fn(u32) -> Result<String, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            response_fn: Box::new(f),
            call_count: Arc::new(AtomicU32::new(0)),
            inputs: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            timeout: Duration::from_millis(1),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Backend-reported timeout; tiny by default so the policy governs.
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn call_count_handle(&self) -> Arc<AtomicU32> {
        self.call_count.clone()
    }

    pub(crate) fn inputs_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.inputs.clone()
    }

    async fn answer(&self, input: String) -> Result<String, ProviderError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.response_fn)(idx)
    }
}

#[async_trait]
impl DescriptionProvider for MockCapability {
    async fn describe(&self, image: &ImageInput) -> Result<String, ProviderError> {
        self.answer(image.media_type.clone()).await
    }
}

#[async_trait]
impl NamingProvider for MockCapability {
    async fn suggest_name(&self, description: &str) -> Result<String, ProviderError> {
        self.answer(description.to_string()).await
    }
}

#[async_trait]
impl ListingProvider for MockCapability {
    async fn generate_listing(
        &self,
        description: &str,
        condition: &str,
    ) -> Result<String, ProviderError> {
        self.answer(format!("{description}|{condition}")).await
    }
}

/// Minimal JPEG-looking bytes: valid magic, arbitrary body.
pub(crate) fn jpeg_bytes(seed: u8) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    bytes.extend((0..64).map(|i| seed.wrapping_add(i)));
    bytes
}
