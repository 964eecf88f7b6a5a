//! Output generation for the static assets that surround the posts artifact.
//!
//! Each submodule is one pipeline stage that reads the artifact (or the HTML
//! shell) and independently writes its own files:
//!
//! - [`head`]: injects SEO/meta/icon tags into `public/index.html`
//! - [`manifest`]: writes `public/manifest.webmanifest` when absent
//! - [`sitemap`]: writes `public/sitemap.xml` and `public/robots.txt`
//! - [`previews`]: renders `public/posts/<slug>/index.html` per post

pub mod head;
pub mod manifest;
pub mod previews;
pub mod sitemap;
