//! Small helpers shared across stages.

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Convert a post title to a URL-safe directory slug.
///
/// Lowercases, replaces every run of non-alphanumeric characters with a
/// single hyphen, and trims leading/trailing hyphens. A title with no usable
/// characters falls back to `"post"`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Hello,  World!"), "hello-world");
/// assert_eq!(slugify("¡¿?!"), "post");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then probes it with a create-and-delete
/// write test. Run early so a misconfigured output path fails the build
/// before any network work happens.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What is a climate definition?"), "what-is-a-climate-definition");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("Solar & wind: 2024 update"), "solar-wind-2024-update");
        assert_eq!(slugify("---"), "post");
        assert_eq!(slugify(""), "post");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing() {
        let dir = std::env::temp_dir().join(format!(
            "climate_site_build_utils_{}",
            std::process::id()
        ));
        let nested = dir.join("a/b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
