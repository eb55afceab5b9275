//! Input checks before an image is sent to the vision backend.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::Stage;

/// Validates source files and works out the MIME type to send upstream.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that the file is readable and within the size limit.
    ///
    /// Returns the file size in bytes.
    pub async fn check_size(&self, path: &Path) -> Result<u64, PipelineError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| PipelineError::Io {
                stage: Stage::Identify,
                path: path.to_path_buf(),
                source,
            })?;

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(metadata.len())
    }

    /// MIME type for an image, by magic bytes first and extension second.
    pub fn media_type(path: &Path, bytes: &[u8]) -> &'static str {
        if let Some(media_type) = Self::sniff_media_type(bytes) {
            return media_type;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("bmp") => "image/bmp",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            other => {
                tracing::warn!(
                    "Unrecognized image type for {:?} ({other:?}), sending as image/jpeg",
                    path
                );
                "image/jpeg"
            }
        }
    }

    /// Match the header bytes against known raster signatures.
    fn sniff_media_type(header: &[u8]) -> Option<&'static str> {
        match header {
            // JPEG: FF D8 FF
            [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
            // PNG: 89 50 4E 47
            [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
            // GIF: GIF8
            [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
            // WebP: RIFF....WEBP
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
            // BMP: BM
            [b'B', b'M', ..] => Some("image/bmp"),
            _ => None,
        }
    }
}
