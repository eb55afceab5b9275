//! Retry utilities for transient provider failures.
//!
//! Provides classification of retryable errors, exponential backoff, and a
//! bounded retry loop with a per-call timeout.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::config::Config;
use crate::error::ProviderError;
use std::time::Duration;

/// Determine whether a provider error is worth retrying.
///
/// Retryable errors: timeouts, rate limits (429), server errors (5xx),
/// connection failures and empty completions.
/// Non-retryable: auth failures, bad requests, missing configuration.
pub fn is_retryable(error: &ProviderError) -> bool {
    match error {
        ProviderError::Timeout { .. } | ProviderError::EmptyResponse { .. } => true,
        ProviderError::Request {
            status_code,
            message,
        } => {
            // Classify by HTTP status code when available (structured)
            if let Some(code) = status_code {
                return *code == 429 || (500..=599).contains(code);
            }
            // Fallback for non-HTTP errors (e.g., connection refused, DNS failure)
            message.contains("timed out") || message.contains("connect")
        }
        ProviderError::Malformed(_) | ProviderError::NotConfigured(_) => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// Bounded retry with a per-call timeout.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 1000,
            timeout_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.pipeline.retry_attempts,
            base_delay_ms: config.pipeline.retry_delay_ms,
            timeout_ms: config.limits.llm_timeout_ms,
        }
    }
}

impl RetryPolicy {
    /// Per-call deadline for `provider`: the configured timeout, raised to
    /// the backend's own when that is longer.
    pub fn call_timeout(&self, provider: &dyn LlmProvider) -> Duration {
        Duration::from_millis(self.timeout_ms).max(provider.timeout())
    }
}

/// Call `provider.generate` until it succeeds, fails permanently, or the
/// retry budget is spent. Returns the last error on exhaustion.
pub async fn generate_with_retry(
    provider: &dyn LlmProvider,
    request: &LlmRequest,
    policy: &RetryPolicy,
) -> Result<LlmResponse, ProviderError> {
    let call_timeout = policy.call_timeout(provider);
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let delay = backoff_duration(attempt - 1, policy.base_delay_ms);
            tracing::debug!(
                "Retry {attempt}/{} on {} after {delay:?}",
                policy.attempts,
                provider.name()
            );
            tokio::time::sleep(delay).await;
        }

        let result = match tokio::time::timeout(call_timeout, provider.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_ms: call_timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(response) => {
                tracing::debug!(
                    "{} answered with {} in {}ms",
                    provider.name(),
                    response.model,
                    response.latency_ms
                );
                return Ok(response);
            }
            Err(e) if is_retryable(&e) && attempt < policy.attempts => {
                tracing::warn!("{} call failed (will retry): {e}", provider.name());
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLlm;
    use std::sync::atomic::Ordering;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            base_delay_ms: 5,
            timeout_ms: 5000,
        }
    }

    #[test]
    fn test_timeout_is_retryable() {
        assert!(is_retryable(&ProviderError::Timeout { timeout_ms: 60000 }));
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = ProviderError::Request {
            message: "HTTP 429: rate limit exceeded".to_string(),
            status_code: Some(429),
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = ProviderError::Request {
            message: "HTTP 503: service unavailable".to_string(),
            status_code: Some(503),
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_auth_error_not_retryable() {
        let err = ProviderError::Request {
            message: "HTTP 401: unauthorized".to_string(),
            status_code: Some(401),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_not_configured_not_retryable() {
        assert!(!is_retryable(&ProviderError::NotConfigured("no key".into())));
    }

    #[test]
    fn test_message_with_500_in_body_not_retryable_without_status() {
        let err = ProviderError::Request {
            message: "Processed 500 tokens successfully".to_string(),
            status_code: None,
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_connection_error_retryable_without_status() {
        let err = ProviderError::Request {
            message: "connection refused".to_string(),
            status_code: None,
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(3, 1000), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
    }

    #[tokio::test]
    async fn test_retry_recovers_after_rate_limit() {
        let provider = MockLlm::fail_then_succeed(Some(429), "rate limited", "ok");
        let calls = provider.call_count_handle();
        let response = generate_with_retry(&provider, &LlmRequest::suggest_name("x"), &fast_policy(2))
            .await
            .unwrap();
        assert_eq!(response.text, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_auth_error() {
        let provider = MockLlm::failing(Some(401), "unauthorized");
        let calls = provider.call_count_handle();
        let err = generate_with_retry(&provider, &LlmRequest::suggest_name("x"), &fast_policy(3))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unauthorized"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausts_retries() {
        let provider = MockLlm::failing(Some(503), "overloaded");
        let calls = provider.call_count_handle();
        let result =
            generate_with_retry(&provider, &LlmRequest::suggest_name("x"), &fast_policy(2)).await;
        assert!(result.is_err());
        // 1 initial + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_becomes_provider_timeout() {
        let provider = MockLlm::success("too slow").with_delay(Duration::from_secs(5));
        let policy = RetryPolicy {
            attempts: 0,
            base_delay_ms: 5,
            timeout_ms: 20,
        };
        let err = generate_with_retry(&provider, &LlmRequest::suggest_name("x"), &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { timeout_ms: 20 }));
    }

    #[tokio::test]
    async fn test_slow_backend_gets_its_own_longer_timeout() {
        let provider = MockLlm::success("worth the wait")
            .with_delay(Duration::from_millis(100))
            .with_timeout(Duration::from_secs(5));
        let policy = RetryPolicy {
            attempts: 0,
            base_delay_ms: 5,
            timeout_ms: 20,
        };
        let response = generate_with_retry(&provider, &LlmRequest::suggest_name("x"), &policy)
            .await
            .unwrap();
        assert_eq!(response.text, "worth the wait");
    }

    #[test]
    fn test_call_timeout_takes_the_longer_of_policy_and_backend() {
        let policy = RetryPolicy {
            timeout_ms: 60_000,
            ..RetryPolicy::default()
        };
        let groq = crate::llm::groq::GroqProvider::new("https://api.groq.com/openai/v1", "k", "m");
        assert_eq!(policy.call_timeout(&groq), Duration::from_secs(90));

        let quick = MockLlm::success("x").with_timeout(Duration::from_secs(1));
        assert_eq!(policy.call_timeout(&quick), Duration::from_secs(60));
    }
}
