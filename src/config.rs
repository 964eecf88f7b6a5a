//! Site configuration.
//!
//! Every stage takes a [`SiteConfig`] by reference instead of reading globals,
//! so tests can point the pipeline at a scratch directory. The config is
//! loaded from `config/site.json` when that file exists and falls back to
//! defaults otherwise; a present-but-malformed file is an error rather than a
//! silent fallback.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to do when a run produces zero posts.
///
/// The two policies observed in production are mutually exclusive: either the
/// build succeeds and the previous artifact is kept (availability wins), or
/// the build fails outright so an empty homepage is never published. This is
/// a single explicit choice; the default favors availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyFetchPolicy {
    /// Keep the previous posts.json (or write `[]` if none) and exit 0.
    #[default]
    KeepPrevious,
    /// Apply the same artifact handling, then fail the build with a non-zero
    /// exit so CI refuses to publish.
    Fail,
}

/// Configuration shared by all pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Canonical site origin, no trailing slash.
    pub base_url: String,
    /// RSS/Atom feed to sync posts from.
    pub feed_url: String,
    /// Site name used in head tags, the manifest, and preview pages.
    pub site_name: String,
    /// Short name for the web-app manifest.
    pub short_name: String,
    /// Meta description injected into the HTML shell.
    pub site_description: String,
    /// Theme color for the manifest and `theme-color` meta tag.
    pub theme_color: String,
    /// Manifest background color.
    pub background_color: String,
    /// User-Agent sent with feed requests.
    pub user_agent: String,
    /// Form action for the subscribe CTA on preview pages.
    pub subscribe_action: String,
    /// Optional redirect target after subscribing.
    pub subscribe_next: Option<String>,
    /// Root of the generated site.
    pub public_dir: PathBuf,
    /// Policy when the feed yields no items.
    pub on_empty_fetch: EmptyFetchPolicy,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://myclimatedefinition.org".to_string(),
            feed_url: "https://medium.com/feed/@myclimatedefinition".to_string(),
            site_name: "My Climate Definition".to_string(),
            short_name: "ClimateDef".to_string(),
            site_description:
                "Stories, definitions, and experiments in sustainability — auto-synced from Medium."
                    .to_string(),
            theme_color: "#0f172a".to_string(),
            background_color: "#ffffff".to_string(),
            user_agent: "MyClimateDefinitionBot/1.0 (+https://myclimatedefinition.org)".to_string(),
            subscribe_action: "#".to_string(),
            subscribe_next: None,
            public_dir: PathBuf::from("public"),
            on_empty_fetch: EmptyFetchPolicy::default(),
        }
    }
}

impl SiteConfig {
    /// Load the config from `path`, or return defaults when the file is
    /// missing. A file that exists but fails to parse is a hard error.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            debug!(path = %path.display(), "No site config file; using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(path = %path.display(), "Loaded site config");
        Ok(config)
    }

    /// The posts artifact consumed by the homepage and downstream stages.
    pub fn posts_path(&self) -> PathBuf {
        self.public_dir.join("posts.json")
    }

    /// The HTML shell that ensure-head mutates.
    pub fn index_path(&self) -> PathBuf {
        self.public_dir.join("index.html")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.public_dir.join("manifest.webmanifest")
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.public_dir.join("sitemap.xml")
    }

    pub fn robots_path(&self) -> PathBuf {
        self.public_dir.join("robots.txt")
    }

    /// Directory holding one preview page per post.
    pub fn previews_dir(&self) -> PathBuf {
        self.public_dir.join("posts")
    }
}
