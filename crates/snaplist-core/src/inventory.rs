//! Append-only CSV inventory of accepted listings.
//!
//! The file is opened in append mode for every write and never truncated or
//! rewritten. The header row is written only when the file is absent or
//! empty. Appends are serialized through a mutex so concurrent workers never
//! interleave bytes within a row.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::InventoryEntry;

/// Column names of the inventory file.
pub const HEADER: [&str; 3] = ["output_file", "title", "description"];

/// Single-writer handle on the inventory file.
#[derive(Debug)]
pub struct InventorySink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl InventorySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, creating the file (with header) on first write.
    pub fn append(&self, entry: &InventoryEntry) -> io::Result<()> {
        // A poisoned lock only means another append panicked; the file is still append-only.
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.write_record([&entry.output_path, &entry.title, &entry.description])?;
        writer.flush()?;

        tracing::debug!("Appended inventory row for {}", entry.output_path);
        Ok(())
    }

    /// Read every data row back. A missing file has no rows.
    pub fn read_entries(&self) -> io::Result<Vec<InventoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;
        reader
            .deserialize()
            .map(|row| row.map_err(io::Error::from))
            .collect()
    }
}
