//! The `snaplist process` command: list every photo in the input directory.

mod batch;
mod setup;
pub mod types;

pub use types::Collision;

use clap::Args;
use snaplist_core::Config;
use std::path::PathBuf;

use batch::run_batch;
use setup::setup_pipeline;

/// Arguments for the `process` command.
///
/// Every flag is optional; omitted values come from the config file.
#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Directory of raw photos (defaults to paths.input_dir)
    pub input: Option<PathBuf>,

    /// Directory for renamed copies (defaults to paths.output_dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Inventory CSV to append to (defaults to paths.inventory_file)
    #[arg(short, long)]
    pub inventory: Option<PathBuf>,

    /// Number of images processed concurrently
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Stop starting new images after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Policy when a renamed file already exists
    #[arg(long, value_enum)]
    pub collision: Option<Collision>,

    /// Item condition used in every listing
    #[arg(long)]
    pub condition: Option<String>,
}

/// Execute the process command against the config loaded at startup.
pub async fn execute(args: ProcessArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_pipeline(&args, config).await?;

    let files = ctx.discovery.discover(&ctx.input_dir);
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", ctx.input_dir);
    } else {
        tracing::info!("Found {} image(s) to process", files.len());
    }

    run_batch(&ctx, files).await
}
