//! Persistence for the posts artifact.
//!
//! `posts.json` is the pipeline's sole durable output. Writes go through a
//! temp-file-then-rename so a killed run never leaves a torn artifact, and
//! the empty fallback is the literal two-byte `[]` token so downstream
//! consumers always see valid JSON.

use crate::models::Post;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};

/// An artifact smaller than this holds no posts (the `[]` floor is 2 bytes).
const MIN_USABLE_LEN: u64 = 2;

/// Errors from reading or writing the posts artifact. These propagate to the
/// process exit code; an unwritable output path is an environment problem,
/// not something to recover from.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize `posts` and atomically replace the artifact at `path`.
///
/// The JSON is pretty-printed UTF-8 with non-ASCII preserved, and the output
/// bytes are a pure function of the input, so rewriting the same list is
/// byte-identical.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = posts.len()))]
pub async fn write_posts(posts: &[Post], path: &Path) -> Result<(), ArtifactError> {
    let json = serde_json::to_string_pretty(posts)?;
    replace_file(path, json.as_bytes()).await?;
    info!("Wrote posts artifact");
    Ok(())
}

/// Write the valid-but-empty artifact: exactly `[]`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_empty(path: &Path) -> Result<(), ArtifactError> {
    replace_file(path, b"[]").await?;
    info!("Wrote empty posts artifact");
    Ok(())
}

/// Read the artifact back as an ordered post list.
pub async fn read_posts(path: &Path) -> Result<Vec<Post>, ArtifactError> {
    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Whether a previous artifact exists and is worth preserving (size > 2
/// bytes, i.e. more than the empty-list token).
pub async fn previous_is_usable(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() > MIN_USABLE_LEN,
        Err(_) => false,
    }
}

/// Whole-file replacement: write a sibling temp file, then rename over the
/// target so readers never observe a partial write.
async fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "Replaced file atomically");
    Ok(())
}
