//! File stem normalization and collision-aware copying into the output directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

use crate::config::CollisionPolicy;

/// Maximum words kept from a naming suggestion.
pub const MAX_STEM_WORDS: usize = 5;

/// Maximum stem length in bytes.
pub const MAX_STEM_LEN: usize = 64;

/// Highest numeric suffix tried by [`CollisionPolicy::Uniquify`].
const MAX_UNIQUE_SUFFIX: u32 = 9999;

const IMAGE_SUFFIXES: [&str; 6] = [".jpg", ".jpeg", ".png", ".bmp", ".gif", ".webp"];

/// Turn a free-form naming suggestion into a lowercase, underscore-joined stem.
///
/// Prefers a backtick-quoted span if the model wrapped its answer in prose,
/// otherwise uses the first non-empty line (after any `label:` prefix).
/// Returns `None` when nothing filesystem-safe is left.
pub fn normalize_stem(suggestion: &str) -> Option<String> {
    let candidate = backtick_span(suggestion).unwrap_or_else(|| first_answer_line(suggestion));
    let mut lowered = candidate
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_lowercase();
    for suffix in IMAGE_SUFFIXES {
        if let Some(stripped) = lowered.strip_suffix(suffix) {
            lowered = stripped.to_string();
            break;
        }
    }

    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(MAX_STEM_WORDS)
        .collect();

    let mut stem = words.join("_");
    if stem.len() > MAX_STEM_LEN {
        stem.truncate(MAX_STEM_LEN);
        while stem.ends_with('_') {
            stem.pop();
        }
    }
    (!stem.is_empty()).then_some(stem)
}

fn backtick_span(text: &str) -> Option<&str> {
    let start = text.find('`')?;
    let rest = text[start..].trim_start_matches('`');
    let end = rest.find('`')?;
    let span = rest[..end].trim();
    (!span.is_empty()).then_some(span)
}

fn first_answer_line(text: &str) -> &str {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    match line.rsplit_once(':') {
        Some((_, after)) if !after.trim().is_empty() => after,
        _ => line,
    }
}

/// Output file name: the stem plus the source's extension, case preserved.
pub fn output_file_name(stem: &str, source: &Path) -> String {
    match source.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_string(),
    }
}

fn suffixed_name(stem: &str, n: u32, source: &Path) -> String {
    if n <= 1 {
        output_file_name(stem, source)
    } else {
        output_file_name(&format!("{stem}_{n}"), source)
    }
}

/// Copy `source` into `dir` under `stem`, honoring the collision policy.
///
/// The source is only ever read: a destination that resolves to the source
/// itself is refused under every policy. With `Overwrite`, the bytes are
/// staged in a private temp file and renamed into place, so concurrent
/// writers to the same name leave one complete file behind.
pub async fn copy_into(
    source: &Path,
    dir: &Path,
    stem: &str,
    policy: CollisionPolicy,
) -> io::Result<PathBuf> {
    match policy {
        CollisionPolicy::Overwrite => {
            let dest = dir.join(output_file_name(stem, source));
            ensure_not_source(source, &dest).await?;
            if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
                tracing::warn!("Overwriting existing output {:?}", dest);
            }
            replace_with_copy(source, &dest).await?;
            Ok(dest)
        }
        CollisionPolicy::Fail => {
            let dest = dir.join(output_file_name(stem, source));
            copy_exclusive(source, &dest).await?;
            Ok(dest)
        }
        CollisionPolicy::Uniquify => {
            for n in 1..=MAX_UNIQUE_SUFFIX {
                let dest = dir.join(suffixed_name(stem, n, source));
                match copy_exclusive(source, &dest).await {
                    Ok(()) => {
                        if n > 1 {
                            tracing::debug!("Name collision for {stem:?}, using {:?}", dest);
                        }
                        return Ok(dest);
                    }
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                    Err(e) => return Err(e),
                }
            }
            Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("no free file name for stem {stem:?} in {}", dir.display()),
            ))
        }
    }
}

/// Refuse a destination that is the source file itself.
async fn ensure_not_source(source: &Path, dest: &Path) -> io::Result<()> {
    let src = tokio::fs::canonicalize(source).await?;
    match tokio::fs::canonicalize(dest).await {
        Ok(existing) if existing == src => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to copy {} onto itself", source.display()),
        )),
        _ => Ok(()),
    }
}

/// Stage a copy next to `dest`, then rename it over `dest`.
async fn replace_with_copy(source: &Path, dest: &Path) -> io::Result<()> {
    static STAGING: AtomicU64 = AtomicU64::new(0);

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = dest.with_file_name(format!(
        ".{file_name}.{}.{}.part",
        std::process::id(),
        STAGING.fetch_add(1, Ordering::Relaxed)
    ));

    copy_exclusive(source, &staging).await?;
    if let Err(e) = tokio::fs::rename(&staging, dest).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }
    Ok(())
}

/// Reserve `dest` atomically (`create_new`) and stream the source bytes into it.
async fn copy_exclusive(source: &Path, dest: &Path) -> io::Result<()> {
    let mut src = tokio::fs::File::open(source).await?;
    let mut dst = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .await?;

    let copied = async {
        tokio::io::copy(&mut src, &mut dst).await?;
        dst.flush().await
    }
    .await;

    if let Err(e) = copied {
        // Don't leave a half-written reservation behind
        let _ = tokio::fs::remove_file(dest).await;
        return Err(e);
    }
    Ok(())
}
