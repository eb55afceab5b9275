//! Snaplist Core - turns a folder of product photos into marketplace listings.
//!
//! Every image flows through a short linear pipeline:
//!
//! ```text
//! Image → Identify (vision) → Rename + copy → Listing (JSON) → Record (CSV row)
//! ```
//!
//! The source photo is never modified. A failure in any stage ends that
//! image's run without touching the others.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use snaplist_core::{
//!     BatchOptions, Capabilities, Config, FileDiscovery, ListingPipeline, LlmBackend,
//!     PipelineOptions, RetryPolicy,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let retry = RetryPolicy::from_config(&config);
//!     let backend = |route| LlmBackend::from_route(route, &config.llm, retry.clone());
//!     let caps = Capabilities::new(
//!         Arc::new(backend(&config.llm.describe)?),
//!         Arc::new(backend(&config.llm.naming)?),
//!         Arc::new(backend(&config.llm.listing)?),
//!     );
//!     let pipeline = ListingPipeline::new(caps, PipelineOptions::from_config(&config)).await?;
//!
//!     let files = FileDiscovery::new(config.processing.clone()).discover(&config.input_dir());
//!     let summary = pipeline
//!         .run_batch(&files, &BatchOptions::from_config(&config), |_| {})
//!         .await;
//!     println!("{} listed, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod llm;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{CollisionPolicy, Config};
pub use error::{
    ConfigError, ErrorKind, FormatError, PipelineError, PipelineResult, ProviderError, Result,
    SnaplistError,
};
pub use inventory::InventorySink;
pub use llm::{DescriptionProvider, ListingProvider, LlmBackend, NamingProvider, RetryPolicy};
pub use pipeline::{
    BatchOptions, BatchSummary, Capabilities, DiscoveredFile, FileDiscovery, ImageOutcome,
    ListingPipeline, PipelineOptions,
};
pub use types::{ImageRecord, InventoryEntry, Listing, Stage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
