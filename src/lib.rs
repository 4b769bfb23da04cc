//! # clean-nav
//!
//! Fragment-swap navigation for static multi-page sites.
//!
//! ## Overview
//!
//! A static site ships one HTML file per page (`donate.html`) but links to clean URLs
//! (`/donate`). clean-nav runs in the browser as WebAssembly, intercepts clicks on internal links,
//! fetches the static file behind the clean URL, and swaps the page's content container in place.
//! The address bar keeps showing the clean URL and back/forward keeps working.
//!
//! When anything goes wrong while loading (network failure, non-success status, missing
//! container) the browser is sent to the real `.html` file instead, so the site degrades to plain
//! multi-page navigation.
//!
//! ## Architecture
//!
//! - **[`paths`]**: clean path → static file mapping
//! - **[`link`]**: which anchors are handled in-page
//! - **[`page`]**: content and metadata extraction from fetched pages
//! - **[`config`]**: [`RouterConfig`] and its TOML/JSON loading
//! - **[`host`]**: the [`PageHost`](host::PageHost), [`PageFetcher`](host::PageFetcher) and
//!   [`PostSwapHook`](host::PostSwapHook) seams
//! - **[`router`]**: the [`Router`] state machine
//! - **[`memory`]**: in-memory host and fetcher
//! - **`wasm`** (feature `wasm`): browser bindings exported to JavaScript
//!
//! ## Quick Start
//!
//! ```rust
//! use clean_nav::{
//!     memory::{MemoryDocument, MemoryHost, StaticFetcher},
//!     router::LoadOutcome,
//!     Router, RouterConfig,
//! };
//! use url::Url;
//!
//! # tokio_test_block_on(async {
//! let fetcher = StaticFetcher::new().with_page(
//!     "donate.html",
//!     r#"<html><head><title>Donate</title></head><body><main id="main-content">Give</main></body></html>"#,
//! );
//! let host = MemoryHost::new(MemoryDocument::new("#main-content", "Home"));
//! let location = Url::parse("https://example.org/").unwrap();
//! let router = Router::new(RouterConfig::default(), host, fetcher, &location).unwrap();
//!
//! let outcome = router.navigate("/donate").await;
//! assert!(matches!(outcome, LoadOutcome::Applied { .. }));
//! assert_eq!(router.host().snapshot().title, "Donate");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ### In the browser (requires `wasm` feature)
//!
//! ```javascript,ignore
//! import init, { install } from './clean_nav.js';
//!
//! await init();
//! const nav = await install({ content_selector: '#main-content' });
//! nav.addHook((selector) => window.AOS && window.AOS.refresh());
//! ```
//!
//! ## Features
//!
//! - **default**: target-independent core
//! - **wasm**: WebAssembly bindings (`web-sys` DOM, fetch and history)

pub mod config;
pub mod error;
pub mod host;
pub mod link;
pub mod memory;
pub mod page;
pub mod paths;
pub mod router;
#[cfg(test)]
mod tests;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::RouterConfig;
pub use error::*;
pub use router::Router;
