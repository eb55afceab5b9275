//! Core data types threaded through the listing pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One step of the fixed, linear pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Identify,
    Rename,
    Listing,
    Record,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Identify => write!(f, "identify"),
            Stage::Rename => write!(f, "rename"),
            Stage::Listing => write!(f, "listing"),
            Stage::Record => write!(f, "record"),
        }
    }
}

/// Per-image state enriched by each stage in turn.
///
/// Created with only `source_path` set. Fields are filled left to right and,
/// once set, are never recomputed by the stage that owns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    // === Input ===
    /// The original, untouched input file
    pub source_path: PathBuf,

    // === Stage outputs ===
    /// Free-text item description from the vision backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Renamed copy inside the output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Sanitized provider text believed to hold the listing JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_raw: Option<String>,

    /// Validated listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<Listing>,
}

impl ImageRecord {
    /// Start a record for an input image.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            description: None,
            output_path: None,
            listing_raw: None,
            listing: None,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

/// Structured marketplace listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub description: String,
}

/// One persisted inventory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Path of the renamed copy, as written to the inventory
    #[serde(rename = "output_file")]
    pub output_path: String,
    pub title: String,
    pub description: String,
}

impl InventoryEntry {
    pub fn new(output_path: &Path, listing: &Listing) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            title: listing.title.clone(),
            description: listing.description.clone(),
        }
    }
}
