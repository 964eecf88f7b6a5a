//! Web-app manifest generation.
//!
//! Writes `public/manifest.webmanifest` once. An existing manifest is never
//! overwritten so site-specific tweaks survive rebuilds.

use crate::config::SiteConfig;
use serde_json::json;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Write the manifest if it does not already exist.
///
/// Returns `true` when a new file was written.
#[instrument(level = "info", skip_all)]
pub async fn gen_manifest(config: &SiteConfig) -> Result<bool, Box<dyn Error>> {
    let path = config.manifest_path();
    if fs::try_exists(&path).await? {
        info!(path = %path.display(), "manifest.webmanifest already exists");
        return Ok(false);
    }

    let manifest = json!({
        "name": config.site_name,
        "short_name": config.short_name,
        "start_url": "/",
        "display": "standalone",
        "background_color": config.background_color,
        "theme_color": config.theme_color,
        "icons": [
            { "src": "/img/icon-192.png", "sizes": "192x192", "type": "image/png" },
            { "src": "/img/icon-512.png", "sizes": "512x512", "type": "image/png" }
        ]
    });

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&path, serde_json::to_string_pretty(&manifest)?).await?;
    info!(path = %path.display(), "Wrote manifest.webmanifest");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(tag: &str) -> SiteConfig {
        let dir = std::env::temp_dir().join(format!(
            "climate_site_build_manifest_{tag}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        SiteConfig {
            public_dir: dir,
            ..SiteConfig::default()
        }
    }

    #[tokio::test]
    async fn test_writes_valid_manifest() {
        let config = config_in("write");
        assert!(gen_manifest(&config).await.unwrap());

        let raw = std::fs::read_to_string(config.manifest_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["name"], "My Climate Definition");
        assert_eq!(value["short_name"], "ClimateDef");
        assert_eq!(value["icons"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_manifest_untouched() {
        let config = config_in("keep");
        std::fs::write(config.manifest_path(), "{\"name\": \"custom\"}").unwrap();

        assert!(!gen_manifest(&config).await.unwrap());
        let raw = std::fs::read_to_string(config.manifest_path()).unwrap();
        assert!(raw.contains("custom"));
    }
}
