//! Command-line interface definitions for the site build pipeline.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Global options override values from the site config file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the site build pipeline.
///
/// Global options apply to every subcommand and take precedence over the
/// corresponding fields in `config/site.json`.
///
/// # Examples
///
/// ```sh
/// # Run the whole pipeline
/// climate_site_build all
///
/// # Only refresh posts.json, failing the build on an empty fetch
/// climate_site_build --fail-on-empty build-posts
///
/// # Build into a scratch directory with a different feed
/// climate_site_build -p ./out --feed-url https://example.com/feed build-posts
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the site config file
    #[arg(short, long, default_value = "config/site.json")]
    pub config: PathBuf,

    /// Override the RSS/Atom feed URL
    #[arg(long, env = "FEED_URL")]
    pub feed_url: Option<String>,

    /// Override the public output directory
    #[arg(short, long)]
    pub public_dir: Option<PathBuf>,

    /// Treat a zero-item fetch as a build failure instead of keeping the
    /// previous posts.json
    #[arg(long)]
    pub fail_on_empty: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// The pipeline stage to run.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch the feed and rebuild public/posts.json
    BuildPosts,
    /// Inject SEO/meta/icon tags into public/index.html
    EnsureHead,
    /// Write public/manifest.webmanifest if it does not exist
    GenManifest,
    /// Write public/sitemap.xml and public/robots.txt
    GenSitemap,
    /// Render static preview pages under public/posts/
    GenPreviews,
    /// Run every stage in order
    All,
}
