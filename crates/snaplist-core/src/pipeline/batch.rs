//! Batch driver: runs the pipeline over many images with bounded concurrency.
//!
//! Each image is an independent unit of work. Results are delivered through a
//! callback as they complete so the caller can report progress in real time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::discovery::DiscoveredFile;
use super::processor::ListingPipeline;
use crate::config::Config;
use crate::error::PipelineError;
use crate::types::InventoryEntry;

/// Concurrency and failure policy for a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum images in flight at once
    pub parallel: usize,
    /// Keep going after an image fails
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: 1,
            continue_on_error: true,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            parallel: config.processing.parallel_workers,
            continue_on_error: config.processing.continue_on_error,
        }
    }
}

/// Result of running one image through the pipeline.
#[derive(Debug)]
pub enum ImageOutcome {
    Processed {
        source: PathBuf,
        entry: InventoryEntry,
    },
    Failed(PipelineError),
}

/// Counts for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Images never started because the batch stopped early
    pub skipped: usize,
    /// The batch stopped at the first failure
    pub aborted: bool,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

impl ListingPipeline {
    /// Process every file, at most `options.parallel` at a time.
    ///
    /// With `continue_on_error` unset, no new image is started once one has
    /// failed; images already in flight still finish and are reported.
    pub async fn run_batch<F>(
        &self,
        files: &[DiscoveredFile],
        options: &BatchOptions,
        on_result: F,
    ) -> BatchSummary
    where
        F: Fn(ImageOutcome) + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(options.parallel.max(1)));
        let abort = Arc::new(AtomicBool::new(false));
        let on_result = Arc::new(on_result);
        let mut handles = Vec::with_capacity(files.len());
        let mut summary = BatchSummary::default();

        for (idx, file) in files.iter().enumerate() {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!("Batch semaphore closed unexpectedly, stopping");
                    summary.skipped += files.len() - idx;
                    break;
                }
            };
            if abort.load(Ordering::SeqCst) {
                summary.skipped += files.len() - idx;
                summary.aborted = true;
                break;
            }

            let pipeline = self.clone();
            let abort = abort.clone();
            let stop_on_error = !options.continue_on_error;
            let on_result = on_result.clone();
            let source = file.path.clone();

            let handle = tokio::spawn(async move {
                let outcome = match pipeline.process(&source).await {
                    Ok(entry) => ImageOutcome::Processed { source, entry },
                    Err(e) => {
                        if stop_on_error {
                            abort.store(true, Ordering::SeqCst);
                        }
                        ImageOutcome::Failed(e)
                    }
                };
                let success = matches!(outcome, ImageOutcome::Processed { .. });
                // Release the permit only after the abort flag is visible
                drop(permit);
                on_result(outcome);
                success
            });
            handles.push(handle);
        }

        for handle in handles {
            match handle.await {
                Ok(true) => summary.succeeded += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    tracing::error!("Image task panicked: {e}");
                    summary.failed += 1;
                }
            }
        }

        if !options.continue_on_error && summary.failed > 0 {
            summary.aborted = true;
        }
        summary
    }
}
