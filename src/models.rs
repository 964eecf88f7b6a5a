//! Data models for normalized posts and ingest outcomes.
//!
//! A [`Post`] is the flat, persisted representation of one feed entry. The
//! JSON shape intentionally duplicates the link under `permalink`,
//! `external_url`, and `url`, and the summary under `summary` and `excerpt`,
//! because different front-end components historically read different keys.

use serde::{Deserialize, Serialize};

/// One normalized article, as written to `posts.json`.
///
/// Field order here is the serialization order of the artifact, so changing
/// it changes the bytes on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Post {
    /// Article headline; `"Untitled"` when the feed entry carries none.
    pub title: String,
    /// Canonical link to the article; `"#"` when absent.
    pub permalink: String,
    /// Alias of `permalink`.
    pub external_url: String,
    /// Alias of `permalink` that many front-end components expect.
    pub url: String,
    /// Alias of `summary`.
    pub excerpt: String,
    /// Plain-text summary: tags stripped, entities unescaped, at most 220
    /// characters, truncated at a word boundary.
    pub summary: String,
    /// Publication timestamp as RFC 3339 UTC, or empty when unknown.
    pub date: String,
    /// Best-effort lead image URL.
    pub image: Option<String>,
}

impl Post {
    /// Build a post from the distinct values, filling in the alias keys.
    pub fn new(
        title: String,
        link: String,
        summary: String,
        date: String,
        image: Option<String>,
    ) -> Self {
        Self {
            title,
            permalink: link.clone(),
            external_url: link.clone(),
            url: link,
            excerpt: summary.clone(),
            summary,
            date,
            image,
        }
    }

    /// Whether the post links somewhere real (not the `"#"` placeholder).
    pub fn has_link(&self) -> bool {
        self.permalink != "#" && !self.permalink.is_empty()
    }
}

/// Result of one ingest run, decided by the writer stage.
///
/// The ingest stage never uses errors for the stale-fallback control flow;
/// the caller maps this outcome (plus the configured
/// [`crate::config::EmptyFetchPolicy`]) to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A non-empty post list was written to the artifact.
    Fresh { count: usize },
    /// The fetch yielded nothing; a usable previous artifact was kept.
    /// `count` is the previous artifact's entry count when it was readable.
    KeptPrevious { count: Option<usize> },
    /// The fetch yielded nothing and no usable previous artifact existed, so
    /// an empty list was written to keep downstream consumers working.
    WroteEmpty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_aliases() {
        let post = Post::new(
            "A title".to_string(),
            "https://example.com/a".to_string(),
            "Short summary".to_string(),
            "2024-01-01T00:00:00+00:00".to_string(),
            None,
        );
        assert_eq!(post.permalink, post.external_url);
        assert_eq!(post.permalink, post.url);
        assert_eq!(post.summary, post.excerpt);
        assert!(post.has_link());
    }

    #[test]
    fn test_placeholder_link_is_not_a_link() {
        let post = Post::new(
            "Untitled".to_string(),
            "#".to_string(),
            String::new(),
            String::new(),
            None,
        );
        assert!(!post.has_link());
    }

    #[test]
    fn test_serialized_key_set() {
        let post = Post::new(
            "A".to_string(),
            "https://example.com".to_string(),
            "s".to_string(),
            String::new(),
            Some("https://example.com/img.png".to_string()),
        );
        let value = serde_json::to_value(&post).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "title",
            "permalink",
            "external_url",
            "url",
            "excerpt",
            "summary",
            "date",
            "image",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj["permalink"], obj["url"]);
    }

    #[test]
    fn test_round_trip() {
        let post = Post::new(
            "Héllo — wörld".to_string(),
            "https://example.com/é".to_string(),
            "Some summary".to_string(),
            "2024-01-01T00:00:00+00:00".to_string(),
            None,
        );
        let json = serde_json::to_string(&post).unwrap();
        let back: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(post, back);
        // Non-ASCII stays literal in the artifact.
        assert!(json.contains("wörld"));
    }
}
