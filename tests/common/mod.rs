//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use clean_nav::memory::{MemoryDocument, StaticFetcher};
use url::Url;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[allow(dead_code)]
pub fn url(path: &str) -> Url {
    Url::parse("https://site.test").unwrap().join(path).unwrap()
}

/// A static page with a `#page` container, canonical link and Open Graph URL.
#[allow(dead_code)]
pub fn page(title: &str, slug: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>{title}</title>
<link rel="canonical" href="https://site.test/{slug}.html">
<meta property="og:url" content="https://site.test/{slug}.html">
</head><body><header>Site</header><section id="page">{body}</section></body></html>"#
    )
}

/// Live document as served for the root page.
#[allow(dead_code)]
pub fn live_document(title: &str) -> MemoryDocument {
    MemoryDocument::new("#page", title)
        .with_canonical("https://site.test/")
        .with_og_url("https://site.test/")
}

/// A small site: home, about and contact pages, contact answering 500.
#[allow(dead_code)]
pub fn site() -> StaticFetcher {
    StaticFetcher::new()
        .with_page("index.html", &page("Home", "index", "<h1>Home</h1>"))
        .with_page("about.html", &page("About Us", "about", "<h1>About</h1>"))
        .with_page(
            "team/index.html",
            &page("Team", "team/index", "<h1>Team</h1>"),
        )
        .with_status("contact.html", http::StatusCode::INTERNAL_SERVER_ERROR)
}
