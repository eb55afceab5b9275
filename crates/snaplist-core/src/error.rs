//! Error types for the snaplist pipeline.
//!
//! Errors are organized by layer: provider calls fail with [`ProviderError`],
//! listing text fails with [`FormatError`], and the pipeline wraps both (plus
//! I/O) into an image-scoped [`PipelineError`] that always names the stage and
//! the source image.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::Stage;

/// Top-level error type for snaplist operations.
#[derive(Error, Debug)]
pub enum SnaplistError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failure of a remote inference capability.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport or HTTP-level failure
    #[error("{message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// The call did not complete within the per-call timeout
    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The backend answered but produced no usable text
    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },

    /// The backend answered with text the caller cannot use
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The backend cannot be constructed (missing key, unknown name)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Listing text that does not have the required JSON shape.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("listing is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("listing JSON is not an object")]
    NotObject,

    #[error("listing is missing string field `{0}`")]
    MissingField(&'static str),

    #[error("listing field `{0}` is empty")]
    EmptyField(&'static str),
}

/// Coarse cause of a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Provider,
    Format,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Provider => write!(f, "provider"),
            ErrorKind::Format => write!(f, "format"),
        }
    }
}

/// Image-scoped pipeline errors. Each aborts only the current image.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading the source, copying it, or writing the inventory failed
    #[error("{stage} stage I/O error for {path}: {source}")]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file exceeds the configured size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// A remote capability call failed
    #[error("{stage} stage provider error for {path}: {source}")]
    Provider {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: ProviderError,
    },

    /// Listing text could not be turned into a title and description
    #[error("{stage} stage format error for {path}: {source}")]
    Format {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// A stage ran on a record that lacks its required input
    #[error("{stage} stage requires `{field}` for {path}")]
    Incomplete {
        stage: Stage,
        path: PathBuf,
        field: &'static str,
    },
}

impl PipelineError {
    /// The stage in which the error occurred.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Io { stage, .. }
            | PipelineError::Provider { stage, .. }
            | PipelineError::Format { stage, .. }
            | PipelineError::Incomplete { stage, .. } => *stage,
            PipelineError::FileTooLarge { .. } => Stage::Identify,
        }
    }

    /// Underlying cause, independent of stage.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Io { .. } | PipelineError::FileTooLarge { .. } => ErrorKind::Io,
            PipelineError::Provider { .. } => ErrorKind::Provider,
            PipelineError::Format { .. } | PipelineError::Incomplete { .. } => ErrorKind::Format,
        }
    }

    /// Source image the failure belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            PipelineError::Io { path, .. }
            | PipelineError::FileTooLarge { path, .. }
            | PipelineError::Provider { path, .. }
            | PipelineError::Format { path, .. }
            | PipelineError::Incomplete { path, .. } => path,
        }
    }
}

/// Convenience type alias for snaplist results.
pub type Result<T> = std::result::Result<T, SnaplistError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
