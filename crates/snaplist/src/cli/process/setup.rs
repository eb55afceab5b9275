//! Pipeline setup: config overrides and backend construction.

use std::path::PathBuf;
use std::sync::Arc;

use snaplist_core::config::ModelRoute;
use snaplist_core::llm::LlmProvider;
use snaplist_core::{
    BatchOptions, Capabilities, Config, FileDiscovery, ListingPipeline, LlmBackend,
    PipelineOptions, RetryPolicy,
};

use super::ProcessArgs;

/// Everything a batch run needs, assembled by `setup_pipeline()`.
pub(crate) struct ProcessContext {
    pub pipeline: ListingPipeline,
    pub discovery: FileDiscovery,
    pub batch: BatchOptions,
    pub input_dir: PathBuf,
}

/// Apply CLI overrides to the already-loaded config and build the pipeline.
pub async fn setup_pipeline(
    args: &ProcessArgs,
    mut config: Config,
) -> anyhow::Result<ProcessContext> {
    apply_overrides(&mut config, args);
    config.validate()?;

    let input_dir = config.input_dir();
    if !input_dir.is_dir() {
        anyhow::bail!(
            "Input directory does not exist: {:?}\n\n  Hint: Pass a directory, or set paths.input_dir in the file shown by `snaplist config path`.",
            input_dir
        );
    }

    let retry = RetryPolicy::from_config(&config);
    let describer = build_backend("describe", &config.llm.describe, &config, &retry).await?;
    let namer = build_backend("naming", &config.llm.naming, &config, &retry).await?;
    let lister = build_backend("listing", &config.llm.listing, &config, &retry).await?;

    let capabilities = Capabilities::new(describer, namer, lister);
    let pipeline = ListingPipeline::new(capabilities, PipelineOptions::from_config(&config)).await?;

    tracing::info!(
        "Listing photos from {:?} into {:?}",
        input_dir,
        pipeline.options().output_dir
    );

    Ok(ProcessContext {
        pipeline,
        discovery: FileDiscovery::new(config.processing.clone()),
        batch: BatchOptions::from_config(&config),
        input_dir,
    })
}

/// CLI flags take precedence over the config file.
fn apply_overrides(config: &mut Config, args: &ProcessArgs) {
    if let Some(input) = &args.input {
        config.paths.input_dir = input.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir = output_dir.clone();
    }
    if let Some(inventory) = &args.inventory {
        config.paths.inventory_file = inventory.clone();
    }
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    if args.fail_fast {
        config.processing.continue_on_error = false;
    }
    if let Some(collision) = args.collision {
        config.processing.collision = collision.into();
    }
    if let Some(condition) = &args.condition {
        config.listing.condition = condition.clone();
    }
}

/// Build one role's backend and warn early when it looks unusable.
async fn build_backend(
    role: &str,
    route: &ModelRoute,
    config: &Config,
    retry: &RetryPolicy,
) -> anyhow::Result<Arc<LlmBackend>> {
    let backend = LlmBackend::from_route(route, &config.llm, retry.clone())
        .map_err(|e| anyhow::anyhow!("Cannot set up the {role} model: {e}"))?;
    warn_if_unavailable(role, backend.provider()).await;
    tracing::debug!("{role}: {} via {}", route.model, route.provider);
    Ok(Arc::new(backend))
}

async fn warn_if_unavailable(role: &str, provider: &dyn LlmProvider) {
    if !provider.is_available().await {
        tracing::warn!(
            "The {role} backend ({}) does not look configured; its calls will likely fail",
            provider.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::process::Collision;
    use snaplist_core::CollisionPolicy;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let args = ProcessArgs {
            input: Some(PathBuf::from("~/photos")),
            output_dir: Some(PathBuf::from("listed")),
            inventory: Some(PathBuf::from("stock.csv")),
            parallel: Some(4),
            fail_fast: true,
            collision: Some(Collision::Overwrite),
            condition: Some("New".to_string()),
        };

        apply_overrides(&mut config, &args);

        assert_eq!(config.paths.input_dir, PathBuf::from("~/photos"));
        assert!(!config.input_dir().starts_with("~"));
        assert_eq!(config.output_dir(), PathBuf::from("listed"));
        assert_eq!(config.inventory_file(), PathBuf::from("stock.csv"));
        assert_eq!(config.processing.parallel_workers, 4);
        assert!(!config.processing.continue_on_error);
        assert_eq!(config.processing.collision, CollisionPolicy::Overwrite);
        assert_eq!(config.listing.condition, "New");
    }

    #[test]
    fn no_flags_keep_config_defaults() {
        let mut config = Config::default();
        apply_overrides(&mut config, &ProcessArgs::default());

        let defaults = Config::default();
        assert_eq!(config.paths.input_dir, defaults.paths.input_dir);
        assert_eq!(config.processing.parallel_workers, 1);
        assert!(config.processing.continue_on_error);
        assert_eq!(config.processing.collision, CollisionPolicy::Uniquify);
    }

    #[test]
    fn zero_parallel_override_fails_validation() {
        let mut config = Config::default();
        let args = ProcessArgs {
            parallel: Some(0),
            ..Default::default()
        };
        apply_overrides(&mut config, &args);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn setup_uses_the_config_it_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.input_dir = dir.path().join("nowhere");

        let err = setup_pipeline(&ProcessArgs::default(), config)
            .await
            .err()
            .unwrap();

        assert!(err.to_string().contains("nowhere"), "{err}");
    }

    #[tokio::test]
    async fn setup_rejects_output_dir_equal_to_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = ProcessArgs {
            input: Some(dir.path().to_path_buf()),
            output_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let err = setup_pipeline(&args, Config::default()).await.err().unwrap();

        assert!(err.to_string().contains("output_dir"), "{err}");
    }
}
