//! Image listing pipeline.
//!
//! - **discovery**: Find eligible images in the input directory
//! - **validate**: Size limits and MIME type detection
//! - **stages**: Identify, Rename, Listing and Record
//! - **naming**: File stem normalization and collision-safe copies
//! - **sanitize**: Cleanup and validation of raw listing text
//! - **processor**: Runs one image through every stage
//! - **batch**: Bounded-concurrency driver over many images

pub mod batch;
pub mod discovery;
pub mod naming;
pub mod processor;
pub mod sanitize;
pub mod stages;
pub mod validate;

pub use batch::{BatchOptions, BatchSummary, ImageOutcome};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use naming::normalize_stem;
pub use processor::{Capabilities, ListingPipeline, PipelineOptions};
pub use sanitize::{parse_listing, sanitize_listing};
pub use validate::Validator;
