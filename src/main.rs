//! Binary entry point for the site build pipeline.
//!
//! Parses the CLI, loads the site config, and runs the requested stage (or
//! every stage in order for `all`). Stages run strictly sequentially; the
//! process exit code is 0 on success — including the graceful stale-fallback
//! — and non-zero on persistence errors or, under the `fail` empty-fetch
//! policy, on a zero-item run.

use clap::Parser;
use std::error::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use climate_site_build::cli::{Cli, Command};
use climate_site_build::config::{EmptyFetchPolicy, SiteConfig};
use climate_site_build::models::IngestOutcome;
use climate_site_build::outputs::{head, manifest, previews, sitemap};
use climate_site_build::utils::ensure_writable_dir;
use climate_site_build::{fetch, ingest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();

    let mut config = SiteConfig::load(&args.config)?;
    if let Some(feed_url) = args.feed_url {
        config.feed_url = feed_url;
    }
    if let Some(public_dir) = args.public_dir {
        config.public_dir = public_dir;
    }
    if args.fail_on_empty {
        config.on_empty_fetch = EmptyFetchPolicy::Fail;
    }
    info!(
        feed = %config.feed_url,
        public_dir = %config.public_dir.display(),
        command = ?args.command,
        "Site build starting"
    );

    // Early check: a broken output path is an environment problem, fail
    // before any network work.
    if let Err(e) = ensure_writable_dir(&config.public_dir).await {
        error!(
            path = %config.public_dir.display(),
            error = %e,
            "Public directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    match args.command {
        Command::BuildPosts => build_posts(&config).await?,
        Command::EnsureHead => {
            head::ensure_head(&config).await?;
        }
        Command::GenManifest => {
            manifest::gen_manifest(&config).await?;
        }
        Command::GenSitemap => sitemap::gen_sitemap(&config).await?,
        Command::GenPreviews => {
            previews::gen_previews(&config).await?;
        }
        Command::All => {
            build_posts(&config).await?;
            head::ensure_head(&config).await?;
            manifest::gen_manifest(&config).await?;
            sitemap::gen_sitemap(&config).await?;
            previews::gen_previews(&config).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(secs = elapsed.as_secs(), millis = elapsed.subsec_millis(), "Build complete");
    Ok(())
}

/// Run the ingest stage and map its outcome to the configured policy.
async fn build_posts(config: &SiteConfig) -> Result<(), Box<dyn Error>> {
    let client = fetch::build_client(&config.user_agent)?;

    match ingest::run(config, &client).await? {
        IngestOutcome::Fresh { count } => {
            info!(count, path = %config.posts_path().display(), "Wrote fresh posts");
            Ok(())
        }
        IngestOutcome::KeptPrevious { count } => {
            warn!(previous_count = count, "Feed yielded no items; previous artifact kept");
            match config.on_empty_fetch {
                EmptyFetchPolicy::KeepPrevious => Ok(()),
                EmptyFetchPolicy::Fail => {
                    Err("feed yielded no items and empty-fetch policy is 'fail'".into())
                }
            }
        }
        IngestOutcome::WroteEmpty => {
            warn!("Feed yielded no items and no previous artifact existed; wrote empty list");
            match config.on_empty_fetch {
                EmptyFetchPolicy::KeepPrevious => Ok(()),
                EmptyFetchPolicy::Fail => {
                    Err("feed yielded no items and empty-fetch policy is 'fail'".into())
                }
            }
        }
    }
}
