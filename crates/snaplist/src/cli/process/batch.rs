//! Batch run: progress bar, per-image failure lines, and the final summary.

use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use snaplist_core::{BatchSummary, DiscoveredFile, ImageOutcome, PipelineError};

use super::setup::ProcessContext;

/// Run every discovered image through the pipeline and report the outcome.
///
/// Fails (non-zero exit) only when the run stopped early under fail-fast.
pub async fn run_batch(ctx: &ProcessContext, files: Vec<DiscoveredFile>) -> anyhow::Result<()> {
    let progress = create_progress_bar(files.len() as u64);
    let start_time = Instant::now();

    let pb = progress.clone();
    let summary = ctx
        .pipeline
        .run_batch(&files, &ctx.batch, move |outcome| {
            if let ImageOutcome::Failed(e) = &outcome {
                tracing::error!("{e}");
                pb.println(failure_line(e));
            }
            pb.inc(1);
        })
        .await;

    progress.finish_and_clear();
    print_summary(ctx, &summary, start_time.elapsed());

    if summary.aborted {
        anyhow::bail!(
            "Stopped after a failure; {} image(s) were not attempted",
            summary.skipped
        );
    }
    Ok(())
}

/// One line per failed image: which image, which stage, what kind of failure.
fn failure_line(error: &PipelineError) -> String {
    format!(
        "  FAILED {} [{} / {}]",
        error.path().display(),
        error.stage(),
        error.kind()
    )
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> ProgressBar {
    use indicatif::ProgressStyle;

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb
}

/// Print the summary after a batch run.
fn print_summary(ctx: &ProcessContext, summary: &BatchSummary, elapsed: Duration) {
    let options = ctx.pipeline.options();

    println!("Processed {} image(s).", summary.succeeded);
    println!("  Output directory: {}", options.output_dir.display());
    println!("  Inventory:        {}", options.inventory_file.display());

    if summary.failed > 0 || summary.skipped > 0 {
        eprintln!();
        eprintln!("    Succeeded:    {:>8}", summary.succeeded);
        eprintln!("    Failed:       {:>8}", summary.failed);
        if summary.skipped > 0 {
            eprintln!("    Skipped:      {:>8}", summary.skipped);
        }
        eprintln!("    Total:        {:>8}", summary.total());
    }
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
}
