//! Pipeline orchestration - wires the stages together for one image.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{CollisionPolicy, Config, LimitsConfig};
use crate::error::{PipelineError, PipelineResult, Result};
use crate::inventory::InventorySink;
use crate::llm::{DescriptionProvider, ListingProvider, NamingProvider};
use crate::types::{ImageRecord, InventoryEntry, Stage};

use super::stages;
use super::validate::Validator;

/// Settings the stages need at run time.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub inventory_file: PathBuf,
    pub collision: CollisionPolicy,
    /// Item condition written into every listing prompt
    pub condition: String,
    pub io_timeout: Duration,
    pub limits: LimitsConfig,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir(),
            inventory_file: config.inventory_file(),
            collision: config.processing.collision,
            condition: config.listing.condition.clone(),
            io_timeout: Duration::from_millis(config.limits.io_timeout_ms),
            limits: config.limits.clone(),
        }
    }
}

/// The three capabilities, one per role.
#[derive(Clone)]
pub struct Capabilities {
    pub describer: Arc<dyn DescriptionProvider>,
    pub namer: Arc<dyn NamingProvider>,
    pub lister: Arc<dyn ListingProvider>,
}

impl Capabilities {
    pub fn new(
        describer: Arc<dyn DescriptionProvider>,
        namer: Arc<dyn NamingProvider>,
        lister: Arc<dyn ListingProvider>,
    ) -> Self {
        Self {
            describer,
            namer,
            lister,
        }
    }
}

/// Runs images through Identify → Rename → Listing → Record.
///
/// Cheap to clone; clones share the inventory sink.
#[derive(Clone)]
pub struct ListingPipeline {
    capabilities: Capabilities,
    sink: Arc<InventorySink>,
    validator: Validator,
    options: Arc<PipelineOptions>,
}

impl ListingPipeline {
    /// Create the pipeline, making sure the output directory exists.
    pub async fn new(capabilities: Capabilities, options: PipelineOptions) -> Result<Self> {
        tokio::fs::create_dir_all(&options.output_dir).await?;
        Ok(Self {
            capabilities,
            sink: Arc::new(InventorySink::new(&options.inventory_file)),
            validator: Validator::new(options.limits.clone()),
            options: Arc::new(options),
        })
    }

    /// Process a single image end to end and return the row it produced.
    pub async fn process(&self, path: &Path) -> PipelineResult<InventoryEntry> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", path);

        let record = self.run_stages(ImageRecord::new(path)).await?;

        let entry = match (&record.output_path, &record.listing) {
            (Some(output_path), Some(listing)) => InventoryEntry::new(output_path, listing),
            _ => {
                return Err(PipelineError::Incomplete {
                    stage: Stage::Record,
                    path: path.to_path_buf(),
                    field: "listing",
                })
            }
        };

        tracing::info!(
            "Listed {:?} as {:?} in {:?}",
            path,
            entry.title,
            start.elapsed()
        );
        Ok(entry)
    }

    /// Thread a record through every stage, stopping at the first failure.
    ///
    /// Stages whose output is already present are skipped, so a partially
    /// enriched record resumes where it left off.
    pub async fn run_stages(&self, record: ImageRecord) -> PipelineResult<ImageRecord> {
        let caps = &self.capabilities;
        let opts = &self.options;

        let t = Instant::now();
        let record = stages::identify(
            record,
            caps.describer.as_ref(),
            &self.validator,
            opts.io_timeout,
        )
        .await?;
        tracing::trace!("  Identify: {:?}", t.elapsed());

        let t = Instant::now();
        let record = stages::rename_and_copy(
            record,
            caps.namer.as_ref(),
            &opts.output_dir,
            opts.collision,
            opts.io_timeout,
        )
        .await?;
        tracing::trace!("  Rename: {:?}", t.elapsed());

        let t = Instant::now();
        let record = stages::generate_listing(record, caps.lister.as_ref(), &opts.condition).await?;
        tracing::trace!("  Listing: {:?}", t.elapsed());

        let t = Instant::now();
        let record = stages::record(record, &self.sink).await?;
        tracing::trace!("  Record: {:?}", t.elapsed());

        Ok(record)
    }

    pub fn sink(&self) -> &InventorySink {
        &self.sink
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}
