//! Sitemap and robots.txt generation from the posts artifact.
//!
//! The sitemap always contains the site root; post permalinks are included
//! only when they parse as absolute http(s) URLs. A missing or unreadable
//! artifact degrades to a root-only sitemap rather than failing the build.

use crate::artifact;
use crate::config::SiteConfig;
use chrono::Local;
use itertools::Itertools;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument, warn};
use url::Url;

const URLSET_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Write `sitemap.xml` and `robots.txt` under the public directory.
#[instrument(level = "info", skip_all)]
pub async fn gen_sitemap(config: &SiteConfig) -> Result<(), Box<dyn Error>> {
    let posts = match artifact::read_posts(&config.posts_path()).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(error = %e, "Posts artifact unreadable; sitemap will only contain the site root");
            Vec::new()
        }
    };

    let base = config.base_url.trim_end_matches('/');
    let urls: Vec<String> = std::iter::once(format!("{base}/"))
        .chain(
            posts
                .iter()
                .map(|p| p.permalink.clone())
                .filter(|u| is_absolute_http(u)),
        )
        .sorted()
        .dedup()
        .collect();

    let lastmod = Local::now().date_naive().to_string();
    let xml = render_sitemap(&urls, &lastmod)?;

    fs::create_dir_all(&config.public_dir).await?;
    fs::write(config.sitemap_path(), xml).await?;
    fs::write(
        config.robots_path(),
        format!("User-agent: *\nAllow: /\nSitemap: {base}/sitemap.xml\n"),
    )
    .await?;

    info!(
        urls = urls.len(),
        sitemap = %config.sitemap_path().display(),
        "Wrote sitemap.xml and robots.txt"
    );
    Ok(())
}

fn is_absolute_http(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn render_sitemap(urls: &[String], lastmod: &str) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", URLSET_XMLNS));
    writer.write_event(Event::Start(urlset))?;

    for url in urls {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", url)?;
        write_text_element(&mut writer, "lastmod", lastmod)?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;

    fn config_in(tag: &str) -> SiteConfig {
        let dir = std::env::temp_dir().join(format!(
            "climate_site_build_sitemap_{tag}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        SiteConfig {
            public_dir: dir,
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_filter() {
        assert!(is_absolute_http("https://example.com/a"));
        assert!(is_absolute_http("http://example.com/a"));
        assert!(!is_absolute_http("#"));
        assert!(!is_absolute_http("/relative/path"));
        assert!(!is_absolute_http("ftp://example.com/a"));
    }

    #[test]
    fn test_render_structure() {
        let urls = vec!["https://example.com/".to_string()];
        let xml = render_sitemap(&urls, "2026-08-25").unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(URLSET_XMLNS));
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<lastmod>2026-08-25</lastmod>"));
    }

    #[test]
    fn test_render_escapes_query_urls() {
        let urls = vec!["https://example.com/a?x=1&y=2".to_string()];
        let xml = render_sitemap(&urls, "2026-08-25").unwrap();
        assert!(xml.contains("x=1&amp;y=2"));
    }

    #[tokio::test]
    async fn test_gen_sitemap_dedupes_and_sorts() {
        let config = config_in("dedupe");
        let posts = vec![
            Post::new(
                "B".to_string(),
                "https://example.com/b".to_string(),
                String::new(),
                String::new(),
                None,
            ),
            Post::new(
                "A".to_string(),
                "https://example.com/a".to_string(),
                String::new(),
                String::new(),
                None,
            ),
            // Duplicate and placeholder links must not produce entries.
            Post::new(
                "B again".to_string(),
                "https://example.com/b".to_string(),
                String::new(),
                String::new(),
                None,
            ),
            Post::new(
                "No link".to_string(),
                "#".to_string(),
                String::new(),
                String::new(),
                None,
            ),
        ];
        artifact::write_posts(&posts, &config.posts_path()).await.unwrap();

        gen_sitemap(&config).await.unwrap();

        let xml = std::fs::read_to_string(config.sitemap_path()).unwrap();
        assert_eq!(xml.matches("<loc>").count(), 3); // root + a + b
        let a = xml.find("https://example.com/a").unwrap();
        let b = xml.find("https://example.com/b").unwrap();
        assert!(a < b);

        let robots = std::fs::read_to_string(config.robots_path()).unwrap();
        assert!(robots.contains("Sitemap: https://myclimatedefinition.org/sitemap.xml"));
    }

    #[tokio::test]
    async fn test_missing_artifact_yields_root_only() {
        let config = config_in("missing");
        gen_sitemap(&config).await.unwrap();
        let xml = std::fs::read_to_string(config.sitemap_path()).unwrap();
        assert_eq!(xml.matches("<loc>").count(), 1);
        assert!(xml.contains("<loc>https://myclimatedefinition.org/</loc>"));
    }
}
