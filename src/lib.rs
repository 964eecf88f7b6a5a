//! # Climate Site Build
//!
//! The build pipeline behind myclimatedefinition.org. It syncs posts from a
//! Medium RSS feed into a JSON artifact consumed by the front end, then
//! generates the static assets that hang off that artifact.
//!
//! ## Pipeline stages
//!
//! 1. **build-posts**: fetch the feed (with retry/backoff), normalize entries
//!    into flat [`models::Post`] records, and write `public/posts.json`. If
//!    the fetch yields nothing, the previous artifact is kept so the homepage
//!    never renders empty.
//! 2. **ensure-head**: inject SEO/meta/icon tags into `public/index.html`.
//! 3. **gen-manifest**: write `public/manifest.webmanifest` if missing.
//! 4. **gen-sitemap**: write `public/sitemap.xml` and `public/robots.txt`
//!    from the posts artifact.
//! 5. **gen-previews**: render one static preview page per post.
//!
//! ## Usage
//!
//! ```sh
//! climate_site_build all
//! climate_site_build --public-dir ./public build-posts
//! ```
//!
//! Stages are strictly sequential; the only durable state is the file tree
//! under the public directory, so a killed run leaves the previous artifact
//! intact (writes are whole-file replacements).

pub mod artifact;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod utils;
