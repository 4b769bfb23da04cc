//! Seams between the navigation logic and the environment it drives.
//!
//! The browser implementations live in [`crate::wasm`]; tests drive the router through in-memory
//! implementations.

use crate::error::NavError;
use serde::{Deserialize, Serialize};

/// State stored with every history entry the router pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavState {
    pub path: String,
}

/// The live document, its history stack and its location.
pub trait PageHost {
    /// Replace the inner markup of the element matching `selector`.
    fn set_container_html(&self, selector: &str, html: &str) -> Result<(), NavError>;

    fn scroll_to_top(&self);

    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    /// Overwrite the canonical link target. Returns false when the document has no canonical link.
    fn set_canonical_href(&self, href: &str) -> bool;

    /// Overwrite the Open Graph URL. Returns false when the document has no `og:url` meta tag.
    fn set_og_url(&self, url: &str) -> bool;

    fn add_body_class(&self, class: &str);

    fn remove_body_class(&self, class: &str);

    /// Push a history entry without reloading.
    fn push_history(&self, state: &NavState, url: &str) -> Result<(), NavError>;

    /// Full browser navigation to `url`.
    fn assign_location(&self, url: &str);
}

/// Network access for static page files.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Fetch `file` (relative to the site root) and return its body. Non-success responses are
    /// errors.
    async fn fetch_page(&self, file: &str) -> Result<String, NavError>;
}

/// Capability run after every content swap, typically re-binding UI widgets that lived inside
/// the replaced subtree.
pub trait PostSwapHook {
    fn name(&self) -> &str;

    fn after_swap(&self, container_selector: &str) -> Result<(), NavError>;
}

/// Hook built from a closure.
pub struct FnHook<F> {
    name: String,
    hook: F,
}

impl<F> FnHook<F>
where
    F: Fn(&str) -> Result<(), NavError>,
{
    pub fn new(name: impl Into<String>, hook: F) -> Self {
        FnHook {
            name: name.into(),
            hook,
        }
    }
}

impl<F> PostSwapHook for FnHook<F>
where
    F: Fn(&str) -> Result<(), NavError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn after_swap(&self, container_selector: &str) -> Result<(), NavError> {
        (self.hook)(container_selector)
    }
}
