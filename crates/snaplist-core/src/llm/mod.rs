//! LLM integration for the three pipeline capabilities.
//!
//! Provides a provider abstraction over several backends (OpenAI, Groq,
//! Ollama), bounded retry with per-call timeouts, and the capability traits
//! the pipeline stages are written against.

pub(crate) mod capability;
pub(crate) mod groq;
pub(crate) mod ollama;
pub(crate) mod openai;
pub(crate) mod provider;
pub(crate) mod retry;

pub use capability::{DescriptionProvider, ListingProvider, LlmBackend, NamingProvider};
pub use provider::{ImageInput, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse};
pub use retry::RetryPolicy;
