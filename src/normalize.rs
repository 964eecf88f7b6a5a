//! Feed normalization: raw feed bytes → flat [`Post`] records.
//!
//! Structural parsing is delegated to `feed-rs`; this module only flattens
//! its entry model into the artifact schema. Every field extraction degrades
//! to a default instead of failing, so a sparse or sloppy entry never aborts
//! the batch.

use crate::models::Post;
use feed_rs::model::Entry;
use feed_rs::parser;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

/// Maximum summary length in characters.
pub const SUMMARY_MAX_CHARS: usize = 220;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).unwrap());

/// Parse feed bytes and normalize every entry.
///
/// A feed that fails to parse yields an empty list (logged), the same as a
/// well-formed feed with no entries; the caller's stale-fallback policy
/// handles both identically.
#[instrument(level = "info", skip_all)]
pub fn posts_from_feed(bytes: &[u8]) -> Vec<Post> {
    let feed = match parser::parse(bytes) {
        Ok(feed) => feed,
        Err(e) => {
            warn!(error = %e, "Feed failed to parse; treating as zero entries");
            return Vec::new();
        }
    };

    let posts: Vec<Post> = feed.entries.iter().map(normalize_entry).collect();
    debug!(count = posts.len(), "Normalized feed entries");
    posts
}

/// Flatten one feed entry into a [`Post`], defaulting every missing field.
pub fn normalize_entry(entry: &Entry) -> Post {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_else(|| "Untitled".to_string());

    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_else(|| "#".to_string());

    let summary_html = entry
        .summary
        .as_ref()
        .map(|t| t.content.as_str())
        .unwrap_or_default();
    let summary = truncate_at_word(&clean_html(summary_html), SUMMARY_MAX_CHARS);

    let date = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();

    let image = extract_image(entry);

    Post::new(title, link, summary, date, image)
}

/// Strip HTML tags, unescape entities, and collapse whitespace.
pub fn clean_html(s: &str) -> String {
    let stripped = TAG_RE.replace_all(s, "");
    let unescaped = html_escape::decode_html_entities(stripped.as_ref()).to_string();
    WS_RE.replace_all(unescaped.trim(), " ").to_string()
}

/// Truncate to at most `max` characters, breaking at the nearest preceding
/// whitespace so a word is never split. Shorter input is returned unchanged;
/// a single run longer than `max` with no whitespace is hard-cut at the
/// character boundary.
pub fn truncate_at_word(s: &str, max: usize) -> String {
    let mut boundary = None;
    for (count, (idx, _)) in s.char_indices().enumerate() {
        if count == max {
            boundary = Some(idx);
            break;
        }
    }
    let Some(cut) = boundary else {
        return s.to_string();
    };

    let head = &s[..cut];
    match head.rfind(char::is_whitespace) {
        Some(ws) => head[..ws].trim_end().to_string(),
        None => head.to_string(),
    }
}

/// Best-effort lead image for an entry. Priority: media-thumbnail, then
/// media-content, then the first inline `<img src>` in the summary and
/// content blobs. Never fails the record.
pub fn extract_image(entry: &Entry) -> Option<String> {
    for media in &entry.media {
        if let Some(thumb) = media.thumbnails.first() {
            return Some(thumb.image.uri.clone());
        }
    }
    for media in &entry.media {
        if let Some(content) = media.content.first()
            && let Some(url) = &content.url
        {
            return Some(url.to_string());
        }
    }

    let mut blob = entry
        .summary
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();
    if let Some(content) = &entry.content
        && let Some(body) = &content.body
    {
        blob.push(' ');
        blob.push_str(body);
    }
    IMG_RE
        .captures(&blob)
        .map(|captures| captures[1].to_string())
}
