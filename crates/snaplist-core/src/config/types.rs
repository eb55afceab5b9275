//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input, output and inventory locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for raw photos
    pub input_dir: PathBuf,

    /// Directory that receives the renamed copies
    pub output_dir: PathBuf,

    /// CSV inventory file appended to for every listed image
    pub inventory_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images/raw"),
            output_dir: PathBuf::from("images/output"),
            inventory_file: PathBuf::from("inventory.csv"),
        }
    }
}

/// What to do when a generated file name already exists in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the existing file. The copy is staged and renamed into place,
    /// so concurrent writers leave one complete file (last rename wins).
    Overwrite,
    /// Append `_2`, `_3`, ... to the stem until a free name is found
    #[default]
    Uniquify,
    /// Fail the image with an I/O error
    Fail,
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of images processed concurrently
    pub parallel_workers: usize,

    /// Eligible input extensions (matched case-insensitively)
    pub supported_formats: Vec<String>,

    /// Keep going after an image fails instead of aborting the run
    pub continue_on_error: bool,

    /// Output file name collision handling
    pub collision: CollisionPolicy,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 1,
            supported_formats: ["jpg", "jpeg", "png", "bmp", "gif", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            continue_on_error: true,
            collision: CollisionPolicy::default(),
        }
    }
}

/// Retry settings for provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max retry attempts for transient provider failures
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum source file size in megabytes
    pub max_file_size_mb: u64,

    /// Per-call timeout for provider requests in milliseconds. Backends with a
    /// longer built-in timeout (Groq, Ollama) keep theirs.
    pub llm_timeout_ms: u64,

    /// Timeout for reading or copying a single file in milliseconds
    pub io_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            llm_timeout_ms: 60_000,
            io_timeout_ms: 30_000,
        }
    }
}

/// Listing generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Condition label every listing is written for
    pub condition: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            condition: "Used - like new".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Which backend and model serve one pipeline role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoute {
    /// Backend name: "openai", "groq" or "ollama"
    pub provider: String,

    /// Model identifier understood by that backend
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl ModelRoute {
    fn new(provider: &str, model: &str, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            temperature,
            max_tokens,
        }
    }

    /// Vision model used by the Identify stage.
    pub fn default_describe() -> Self {
        Self::new("openai", "gpt-4o-2024-11-20", 0.0, 300)
    }

    /// Small, cheap text model used by the Rename stage.
    pub fn default_naming() -> Self {
        Self::new("groq", "llama-3.1-8b-instant", 0.2, 32)
    }

    /// Reasoning model used by the Listing stage. Its hidden reasoning block
    /// counts against the token budget, hence the larger limit.
    pub fn default_listing() -> Self {
        Self::new("groq", "deepseek-r1-distill-llama-70b", 0.2, 2048)
    }
}

/// LLM routing and backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Route for image descriptions
    pub describe: ModelRoute,

    /// Route for file name suggestions
    pub naming: ModelRoute,

    /// Route for listing generation
    pub listing: ModelRoute,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Groq configuration
    pub groq: Option<GroqConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            describe: ModelRoute::default_describe(),
            naming: ModelRoute::default_naming(),
            listing: ModelRoute::default_listing(),
            openai: None,
            groq: None,
            ollama: None,
        }
    }
}

impl LlmConfig {
    /// All three routes, labelled for diagnostics.
    pub fn routes(&self) -> [(&'static str, &ModelRoute); 3] {
        [
            ("describe", &self.describe),
            ("naming", &self.naming),
            ("listing", &self.listing),
        ]
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Chat Completions base URL
    pub endpoint: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "${OPENAI_API_KEY}".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Groq configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// OpenAI-compatible base URL
    pub endpoint: String,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: "${GROQ_API_KEY}".to_string(),
            endpoint: "https://api.groq.com/openai/v1".to_string(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
        }
    }
}
