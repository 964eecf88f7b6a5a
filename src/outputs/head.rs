//! Head-tag injection for the HTML shell.
//!
//! Adds the description/canonical/Open Graph/Twitter/icon/manifest tags to
//! `public/index.html` once. The check is marker-based rather than
//! idempotent-by-parsing: if any of the known tags is already present the
//! file is left alone, so hand-edited shells are never clobbered.

use crate::config::SiteConfig;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Tags whose presence means the shell was already processed (or curated by
/// hand) and must not be touched.
const MARKERS: [&str; 4] = [
    "og:image",
    "manifest.webmanifest",
    "apple-touch-icon",
    "favicon.ico",
];

/// What the stage did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadOutcome {
    /// Tags were inserted before `</head>` and the file rewritten.
    Injected,
    /// A marker tag was already present; file untouched.
    AlreadyPresent,
    /// No `</head>` found; nothing safe to do.
    NoHeadTag,
}

/// Inject head tags into the site shell if they are not already there.
///
/// A missing `index.html` is an error: the shell is a checked-in source
/// file, so its absence means the build is running in the wrong directory.
#[instrument(level = "info", skip_all)]
pub async fn ensure_head(config: &SiteConfig) -> Result<HeadOutcome, Box<dyn Error>> {
    let path = config.index_path();
    let html = fs::read_to_string(&path).await?;

    if MARKERS.iter().any(|m| html.contains(m)) {
        info!(path = %path.display(), "Head tags already present; no changes");
        return Ok(HeadOutcome::AlreadyPresent);
    }

    if !html.contains("</head>") {
        warn!(path = %path.display(), "No </head> found; skipped injection");
        return Ok(HeadOutcome::NoHeadTag);
    }

    let injected = html.replace("</head>", &format!("{}\n</head>", head_snippet(config)));
    fs::write(&path, injected).await?;
    info!(path = %path.display(), "Injected head tags");
    Ok(HeadOutcome::Injected)
}

/// The tag block inserted before `</head>`, built from the site config.
fn head_snippet(config: &SiteConfig) -> String {
    let base = config.base_url.trim_end_matches('/');
    let name = &config.site_name;
    let description = &config.site_description;
    format!(
        r#"  <meta name="description" content="{description}">
  <link rel="canonical" href="{base}/">
  <meta property="og:type" content="website">
  <meta property="og:title" content="{name}">
  <meta property="og:description" content="{description}">
  <meta property="og:url" content="{base}/">
  <meta property="og:image" content="{base}/img/og.png">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:title" content="{name}">
  <meta name="twitter:description" content="{description}">
  <meta name="twitter:image" content="{base}/img/og.png">
  <link rel="icon" href="/img/favicon.ico" sizes="any">
  <link rel="icon" type="image/png" href="/img/favicon-32.png" sizes="32x32">
  <link rel="icon" type="image/png" href="/img/favicon-16.png" sizes="16x16">
  <link rel="apple-touch-icon" href="/img/apple-touch-icon.png">
  <link rel="manifest" href="/manifest.webmanifest">
  <meta name="theme-color" content="{theme}">"#,
        theme = config.theme_color,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_in(tag: &str) -> SiteConfig {
        let dir = std::env::temp_dir().join(format!(
            "climate_site_build_head_{tag}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        SiteConfig {
            public_dir: dir,
            ..SiteConfig::default()
        }
    }

    fn write_index(config: &SiteConfig, html: &str) -> PathBuf {
        let path = config.index_path();
        std::fs::write(&path, html).unwrap();
        path
    }

    #[tokio::test]
    async fn test_injects_into_bare_shell() {
        let config = config_in("inject");
        let path = write_index(&config, "<html><head><title>t</title></head><body></body></html>");

        let outcome = ensure_head(&config).await.unwrap();
        assert_eq!(outcome, HeadOutcome::Injected);

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("manifest.webmanifest"));
        assert!(html.contains(r#"property="og:title""#));
        assert!(html.contains(&config.theme_color));
        // The snippet lands inside <head>.
        assert!(html.find("og:image").unwrap() < html.find("</head>").unwrap());
    }

    #[tokio::test]
    async fn test_marker_present_leaves_file_untouched() {
        let config = config_in("marker");
        let original = r#"<html><head><link rel="icon" href="/img/favicon.ico"></head></html>"#;
        let path = write_index(&config, original);

        let outcome = ensure_head(&config).await.unwrap();
        assert_eq!(outcome, HeadOutcome::AlreadyPresent);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_no_head_tag_skips() {
        let config = config_in("nohead");
        write_index(&config, "<html><body>fragment</body></html>");
        let outcome = ensure_head(&config).await.unwrap();
        assert_eq!(outcome, HeadOutcome::NoHeadTag);
    }

    #[tokio::test]
    async fn test_missing_index_is_an_error() {
        let config = config_in("missing");
        assert!(ensure_head(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let config = config_in("rerun");
        let path = write_index(&config, "<html><head></head><body></body></html>");

        assert_eq!(ensure_head(&config).await.unwrap(), HeadOutcome::Injected);
        let after_first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            ensure_head(&config).await.unwrap(),
            HeadOutcome::AlreadyPresent
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
    }
}
