//! The three inference capabilities the pipeline depends on.
//!
//! Stages only see these traits. `LlmBackend` implements all of them on top
//! of any [`LlmProvider`], so each role can be served by a different model.

use super::provider::{ImageInput, LlmProvider, LlmProviderFactory, LlmRequest};
use super::retry::{generate_with_retry, RetryPolicy};
use crate::config::{LlmConfig, ModelRoute};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::sync::Arc;

/// Vision capability: image in, free-text description out.
#[async_trait]
pub trait DescriptionProvider: Send + Sync {
    async fn describe(&self, image: &ImageInput) -> Result<String, ProviderError>;
}

/// Cheap text capability: description in, short file stem suggestion out.
#[async_trait]
pub trait NamingProvider: Send + Sync {
    async fn suggest_name(&self, description: &str) -> Result<String, ProviderError>;
}

/// Reasoning text capability: description in, raw listing text out.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    async fn generate_listing(
        &self,
        description: &str,
        condition: &str,
    ) -> Result<String, ProviderError>;
}

/// A backend bound to one route's sampling settings and retry policy.
pub struct LlmBackend {
    provider: Arc<dyn LlmProvider>,
    route: ModelRoute,
    retry: RetryPolicy,
}

impl LlmBackend {
    pub fn new(provider: Arc<dyn LlmProvider>, route: ModelRoute, retry: RetryPolicy) -> Self {
        Self {
            provider,
            route,
            retry,
        }
    }

    /// Build the backend for a configured route.
    pub fn from_route(
        route: &ModelRoute,
        config: &LlmConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderError> {
        let provider = LlmProviderFactory::create(route, config)?;
        Ok(Self::new(Arc::from(provider), route.clone(), retry))
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    pub fn route(&self) -> &ModelRoute {
        &self.route
    }

    async fn complete(&self, request: LlmRequest) -> Result<String, ProviderError> {
        let request = request.with_route(&self.route);
        let response = generate_with_retry(self.provider.as_ref(), &request, &self.retry).await?;
        if let Some(tokens) = response.tokens_used {
            tracing::trace!("{} used {tokens} tokens", self.route.model);
        }
        let text = response.text.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: self.provider.name().to_string(),
            });
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl DescriptionProvider for LlmBackend {
    async fn describe(&self, image: &ImageInput) -> Result<String, ProviderError> {
        self.complete(LlmRequest::describe_item(image.clone())).await
    }
}

#[async_trait]
impl NamingProvider for LlmBackend {
    async fn suggest_name(&self, description: &str) -> Result<String, ProviderError> {
        self.complete(LlmRequest::suggest_name(description)).await
    }
}

#[async_trait]
impl ListingProvider for LlmBackend {
    async fn generate_listing(
        &self,
        description: &str,
        condition: &str,
    ) -> Result<String, ProviderError> {
        self.complete(LlmRequest::marketplace_listing(description, condition))
            .await
    }
}
