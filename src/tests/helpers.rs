//! Shared fixtures for router testing

use crate::{
    config::RouterConfig,
    memory::{MemoryDocument, MemoryHost, StaticFetcher},
    router::Router,
};
use url::Url;

pub const ORIGIN: &str = "https://example.org";

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

pub fn location(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

/// A complete static page whose container holds `body`.
pub fn page_html(title: &str, slug: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>{title}</title>
<link rel="canonical" href="{ORIGIN}/{slug}.html">
<meta property="og:url" content="{ORIGIN}/{slug}.html">
</head>
<body>
<nav><a href="/">Home</a></nav>
<main id="main-content">{body}</main>
</body>
</html>"#
    )
}

/// The live document as served for `/`.
pub fn home_document() -> MemoryDocument {
    MemoryDocument::new("#main-content", "Open Doors Community")
        .with_canonical(&format!("{ORIGIN}/"))
        .with_og_url(&format!("{ORIGIN}/"))
}

/// Static site with the four listed pages plus the index.
pub fn site_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_page(
            "index.html",
            &page_html("Open Doors Community", "index", "Welcome"),
        )
        .with_page(
            "mission.html",
            &page_html("Our Mission | Open Doors Community", "mission", "Mission"),
        )
        .with_page(
            "programs.html",
            &page_html("Programs | Open Doors Community", "programs", "Programs"),
        )
        .with_page(
            "get-involved.html",
            &page_html(
                "Get Involved | Open Doors Community",
                "get-involved",
                "Volunteer",
            ),
        )
        .with_page(
            "donate.html",
            &page_html("Donate | Open Doors Community", "donate", "Hello"),
        )
}

pub fn create_router(start: &str) -> Router<MemoryHost, StaticFetcher> {
    init_logging();
    create_router_with(start, home_document(), site_fetcher())
}

pub fn create_router_with(
    start: &str,
    document: MemoryDocument,
    fetcher: StaticFetcher,
) -> Router<MemoryHost, StaticFetcher> {
    init_logging();
    Router::new(
        RouterConfig::default().with_base_url(ORIGIN),
        MemoryHost::new(document),
        fetcher,
        &location(start),
    )
    .unwrap()
}
