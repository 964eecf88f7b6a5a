//! Static preview pages, one per post.
//!
//! Each post gets `public/posts/<slug>/index.html`: a lightweight page with
//! the summary, a canonical link to the original article, and a subscribe
//! CTA wired to the configured form endpoint. Safe to run repeatedly;
//! existing previews are overwritten.

use crate::artifact;
use crate::config::SiteConfig;
use crate::models::Post;
use crate::utils::slugify;
use std::error::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

const TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <link rel="stylesheet" href="/css/style.css" />
  <link rel="stylesheet" href="/css/modern.css" />
  {canonical}
</head>
<body class="mc-theme-v2">
  <header class="site-header">
    <div class="container header-inner">
      <a class="logo" href="/" aria-label="{site_name}">
        <img id="logoImg" class="header-logo-img" src="/img/logo.png" alt="logo">
        <span class="brand-text">{site_name}</span>
      </a>
      <nav id="site-nav" class="nav" aria-hidden="false">
        <a href="/">Home</a>
        <a href="/about.html">About</a>
        <a href="/contact.html">Contact</a>
      </nav>
    </div>
  </header>

  <main class="container">
    <article class="card">
      <header class="page-hero">
        <h1>{title}</h1>
        <p class="lead">{summary}</p>
        <p class="muted-xs">Published: {date}</p>
      </header>

      <section class="stack">
        <p>{summary}</p>
        <p><a class="btn btn-primary" href="{original_url}" target="_blank" rel="noopener">Read full article on Medium →</a></p>
      </section>

      <section class="mc-cta-band">
        <div>
          <strong>Get short, practical updates</strong>
          <p class="muted">Subscribe to small experiments and notes.</p>
        </div>
        <form class="mc-news" action="{subscribe_action}" method="POST">
          <input name="email" type="email" placeholder="you@example.com" required>
          <input type="hidden" name="_captcha" value="false">
          {subscribe_next}
          <button class="btn btn-primary" type="submit">Subscribe</button>
        </form>
      </section>

    </article>
  </main>

  <footer class="site-footer">
    <div class="container footer-bottom">
      <p>© <span id="year"></span> {site_name}</p>
      <a href="/" class="backtop">Back to home</a>
    </div>
  </footer>

  <script src="/js/main.js" defer></script>
  <script src="/js/ui-enhancements.js" defer></script>
</body>
</html>
"#;

/// Render a preview page for every post in the artifact.
///
/// Returns the number of pages written. A missing artifact logs and writes
/// nothing; this stage is downstream of build-posts and must not fail a
/// build that chose the empty-artifact floor.
#[instrument(level = "info", skip_all)]
pub async fn gen_previews(config: &SiteConfig) -> Result<usize, Box<dyn Error>> {
    let posts_path = config.posts_path();
    let posts = match artifact::read_posts(&posts_path).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(path = %posts_path.display(), error = %e, "No readable posts artifact; skipping previews");
            return Ok(0);
        }
    };

    let out_dir = config.previews_dir();
    fs::create_dir_all(&out_dir).await?;

    let mut written = 0usize;
    for post in &posts {
        let slug = slugify(&post.title);
        let page_dir = out_dir.join(&slug);
        fs::create_dir_all(&page_dir).await?;
        let path = page_dir.join("index.html");
        fs::write(&path, render_preview(post, config)).await?;
        debug!(path = %path.display(), "Wrote preview page");
        written += 1;
    }

    info!(count = written, dir = %out_dir.display(), "Preview pages written");
    Ok(written)
}

/// Fill the page template for one post. Title and summary are HTML-escaped;
/// the canonical link is emitted only when the post has a real URL.
fn render_preview(post: &Post, config: &SiteConfig) -> String {
    let title = html_escape::encode_text(&post.title).to_string();
    let summary = html_escape::encode_text(&post.summary).to_string();

    let canonical = if post.has_link() {
        format!(r#"<link rel="canonical" href="{}" />"#, post.permalink)
    } else {
        String::new()
    };

    let subscribe_next = match &config.subscribe_next {
        Some(next) => format!(r#"<input type="hidden" name="_next" value="{next}">"#),
        None => String::new(),
    };

    TEMPLATE
        .replace("{site_name}", &config.site_name)
        .replace("{title}", &title)
        .replace("{summary}", &summary)
        .replace("{date}", &post.date)
        .replace("{original_url}", &post.permalink)
        .replace("{canonical}", &canonical)
        .replace("{subscribe_action}", &config.subscribe_action)
        .replace("{subscribe_next}", &subscribe_next)
}
