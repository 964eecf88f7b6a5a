//! The feed-ingestion stage: fetch → normalize → persist.
//!
//! This is the only stage with real failure handling. Fetch failures (after
//! retries) and unparseable feeds both degrade to "zero items this run",
//! which triggers the stale-fallback policy: a previous non-trivial artifact
//! is kept untouched, because a stale listing beats an empty homepage. Only
//! persistence errors propagate.

use crate::artifact;
use crate::config::SiteConfig;
use crate::fetch::{self, RetryPolicy};
use crate::models::IngestOutcome;
use crate::normalize;
use reqwest::Client;
use tracing::{error, info, instrument};

/// Run one ingest pass with the default retry policy.
pub async fn run(
    config: &SiteConfig,
    client: &Client,
) -> Result<IngestOutcome, artifact::ArtifactError> {
    run_with_retry(config, client, RetryPolicy::default()).await
}

/// Run one ingest pass.
///
/// Returns the explicit outcome instead of encoding the fallback in errors;
/// the caller decides the exit code from the outcome and the configured
/// [`crate::config::EmptyFetchPolicy`].
#[instrument(level = "info", skip_all, fields(feed = %config.feed_url))]
pub async fn run_with_retry(
    config: &SiteConfig,
    client: &Client,
    retry: RetryPolicy,
) -> Result<IngestOutcome, artifact::ArtifactError> {
    let posts = match fetch::fetch_feed(client, &config.feed_url, retry).await {
        Ok(bytes) => normalize::posts_from_feed(&bytes),
        Err(e) => {
            error!(error = %e, "Feed fetch failed after retries; treating as zero items");
            Vec::new()
        }
    };

    let path = config.posts_path();

    if !posts.is_empty() {
        let count = posts.len();
        artifact::write_posts(&posts, &path).await?;
        return Ok(IngestOutcome::Fresh { count });
    }

    if artifact::previous_is_usable(&path).await {
        let count = artifact::read_posts(&path).await.map(|p| p.len()).ok();
        info!(
            previous_count = count,
            path = %path.display(),
            "No new items; keeping previous posts artifact"
        );
        return Ok(IngestOutcome::KeptPrevious { count });
    }

    artifact::write_empty(&path).await?;
    info!(path = %path.display(), "No items and no previous artifact; wrote empty list");
    Ok(IngestOutcome::WroteEmpty)
}
