//! The four pipeline stages: Identify → Rename → Listing → Record.
//!
//! Each stage takes the record by value, performs at most one capability
//! call, and hands the enriched record back. Identify, Rename and Listing
//! return the record untouched when their output field is already set, so
//! re-running them never makes a second call or a second copy.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::naming::{copy_into, normalize_stem};
use super::sanitize::{parse_listing, sanitize_and_parse};
use super::validate::Validator;
use crate::config::CollisionPolicy;
use crate::error::{PipelineError, PipelineResult, ProviderError};
use crate::inventory::InventorySink;
use crate::llm::{DescriptionProvider, ImageInput, ListingProvider, NamingProvider};
use crate::types::{ImageRecord, InventoryEntry, Stage};

async fn with_io_timeout<T>(
    timeout: Duration,
    fut: impl Future<Output = io::Result<T>>,
) -> io::Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("timed out after {}ms", timeout.as_millis()),
        )),
    }
}

fn require<'a, T: ?Sized>(
    value: Option<&'a T>,
    stage: Stage,
    field: &'static str,
    path: &Path,
) -> PipelineResult<&'a T> {
    value.ok_or_else(|| PipelineError::Incomplete {
        stage,
        path: path.to_path_buf(),
        field,
    })
}

fn provider_error(stage: Stage, path: &Path) -> impl FnOnce(ProviderError) -> PipelineError {
    let path = path.to_path_buf();
    move |source| PipelineError::Provider {
        stage,
        path,
        source,
    }
}

fn io_error(stage: Stage, path: &Path) -> impl FnOnce(io::Error) -> PipelineError {
    let path = path.to_path_buf();
    move |source| PipelineError::Io {
        stage,
        path,
        source,
    }
}

/// Identify: read the image and ask the vision backend for a description.
pub async fn identify(
    mut record: ImageRecord,
    describer: &dyn DescriptionProvider,
    validator: &Validator,
    io_timeout: Duration,
) -> PipelineResult<ImageRecord> {
    if record.description.is_some() {
        return Ok(record);
    }
    let path = record.source_path.clone();

    validator.check_size(&path).await?;
    let bytes = with_io_timeout(io_timeout, tokio::fs::read(&path))
        .await
        .map_err(io_error(Stage::Identify, &path))?;

    let image = ImageInput::from_bytes(&bytes, Validator::media_type(&path, &bytes));
    let description = describer
        .describe(&image)
        .await
        .map_err(provider_error(Stage::Identify, &path))?;

    let description = description.trim();
    if description.is_empty() {
        return Err(PipelineError::Provider {
            stage: Stage::Identify,
            path,
            source: ProviderError::EmptyResponse {
                provider: "description".to_string(),
            },
        });
    }

    tracing::debug!("Identified {:?}: {description}", path);
    record.description = Some(description.to_string());
    Ok(record)
}

/// Rename: derive a file stem from the description and copy the original
/// into the output directory under it.
pub async fn rename_and_copy(
    mut record: ImageRecord,
    namer: &dyn NamingProvider,
    output_dir: &Path,
    collision: CollisionPolicy,
    io_timeout: Duration,
) -> PipelineResult<ImageRecord> {
    if record.output_path.is_some() {
        return Ok(record);
    }
    let path = record.source_path.clone();
    let description = require(record.description.as_deref(), Stage::Rename, "description", &path)?;

    let suggestion = namer
        .suggest_name(description)
        .await
        .map_err(provider_error(Stage::Rename, &path))?;
    let stem = normalize_stem(&suggestion).ok_or_else(|| PipelineError::Provider {
        stage: Stage::Rename,
        path: path.clone(),
        source: ProviderError::Malformed(format!("unusable file name {suggestion:?}")),
    })?;

    let output_path: PathBuf = with_io_timeout(
        io_timeout,
        copy_into(&path, output_dir, &stem, collision),
    )
    .await
    .map_err(io_error(Stage::Rename, &path))?;

    tracing::debug!("Copied {:?} -> {:?}", path, output_path);
    record.output_path = Some(output_path);
    Ok(record)
}

/// Listing: ask for a marketplace listing, sanitize the answer and validate it.
///
/// The sanitized text is kept in `listing_raw`; a text that does not hold a
/// JSON object with non-empty `title` and `description` fails the image.
pub async fn generate_listing(
    mut record: ImageRecord,
    lister: &dyn ListingProvider,
    condition: &str,
) -> PipelineResult<ImageRecord> {
    if record.listing.is_some() {
        return Ok(record);
    }
    let path = record.source_path.clone();
    let description =
        require(record.description.as_deref(), Stage::Listing, "description", &path)?;

    let raw = lister
        .generate_listing(description, condition)
        .await
        .map_err(provider_error(Stage::Listing, &path))?;

    let (cleaned, parsed) = sanitize_and_parse(&raw);
    record.listing_raw = Some(cleaned);
    let listing = parsed.map_err(|source| PipelineError::Format {
        stage: Stage::Listing,
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Listing for {:?}: {:?}", path, listing.title);
    record.listing = Some(listing);
    Ok(record)
}

/// Record: append the finished listing to the inventory.
///
/// Parses `listing_raw` if the structured listing is absent. A failed write
/// does not undo the copy made by the Rename stage.
pub async fn record(mut record: ImageRecord, sink: &InventorySink) -> PipelineResult<ImageRecord> {
    let path = record.source_path.clone();

    let listing = match record.listing.take() {
        Some(listing) => listing,
        None => {
            let raw = require(record.listing_raw.as_deref(), Stage::Record, "listing_raw", &path)?;
            parse_listing(raw).map_err(|source| PipelineError::Format {
                stage: Stage::Record,
                path: path.clone(),
                source,
            })?
        }
    };
    let output_path = require(record.output_path.as_deref(), Stage::Record, "output_path", &path)?;

    let entry = InventoryEntry::new(output_path, &listing);
    sink.append(&entry).map_err(io_error(Stage::Record, &path))?;

    record.listing = Some(listing);
    Ok(record)
}
