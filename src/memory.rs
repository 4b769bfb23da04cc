//! In-memory [`PageHost`] and [`PageFetcher`] implementations.
//!
//! These record every effect the router has on the page, which makes them the harness for the
//! native test suite and for checking a site's navigation behavior outside a browser.

use crate::{
    error::NavError,
    host::{NavState, PageFetcher, PageHost},
};
use http::StatusCode;
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
};

/// Observable state of a simulated document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryDocument {
    pub container_selector: String,
    /// Inner markup of the content container. None when the document has no container.
    pub container_html: Option<String>,
    pub title: String,
    pub canonical_href: Option<String>,
    pub og_url: Option<String>,
    pub body_classes: BTreeSet<String>,
    /// Pushed entries as (state, url), oldest first.
    pub history: Vec<(NavState, String)>,
    /// Full navigations requested through `assign_location`.
    pub assigned_locations: Vec<String>,
    pub scroll_resets: usize,
}

impl MemoryDocument {
    /// A document with an empty container matching `container_selector`.
    pub fn new(container_selector: &str, title: &str) -> Self {
        MemoryDocument {
            container_selector: container_selector.to_string(),
            container_html: Some(String::new()),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_canonical(mut self, href: &str) -> Self {
        self.canonical_href = Some(href.to_string());
        self
    }

    pub fn with_og_url(mut self, url: &str) -> Self {
        self.og_url = Some(url.to_string());
        self
    }

    pub fn without_container(mut self) -> Self {
        self.container_html = None;
        self
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    document: RefCell<MemoryDocument>,
}

impl MemoryHost {
    pub fn new(document: MemoryDocument) -> Self {
        MemoryHost {
            document: RefCell::new(document),
        }
    }

    /// Copy of the current document state.
    pub fn snapshot(&self) -> MemoryDocument {
        self.document.borrow().clone()
    }

    pub fn set_document_title(&self, title: &str) {
        self.document.borrow_mut().title = title.to_string();
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.document.borrow().body_classes.contains(class)
    }
}

impl PageHost for MemoryHost {
    fn set_container_html(&self, selector: &str, html: &str) -> Result<(), NavError> {
        let mut doc = self.document.borrow_mut();
        if doc.container_selector != selector {
            return Err(NavError::Dom(format!("no element matches '{selector}'")));
        }
        match doc.container_html.as_mut() {
            Some(container) => {
                *container = html.to_string();
                Ok(())
            }
            None => Err(NavError::Dom(format!("no element matches '{selector}'"))),
        }
    }

    fn scroll_to_top(&self) {
        self.document.borrow_mut().scroll_resets += 1;
    }

    fn title(&self) -> String {
        self.document.borrow().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.document.borrow_mut().title = title.to_string();
    }

    fn set_canonical_href(&self, href: &str) -> bool {
        match self.document.borrow_mut().canonical_href.as_mut() {
            Some(current) => {
                *current = href.to_string();
                true
            }
            None => false,
        }
    }

    fn set_og_url(&self, url: &str) -> bool {
        match self.document.borrow_mut().og_url.as_mut() {
            Some(current) => {
                *current = url.to_string();
                true
            }
            None => false,
        }
    }

    fn add_body_class(&self, class: &str) {
        self.document
            .borrow_mut()
            .body_classes
            .insert(class.to_string());
    }

    fn remove_body_class(&self, class: &str) {
        self.document.borrow_mut().body_classes.remove(class);
    }

    fn push_history(&self, state: &NavState, url: &str) -> Result<(), NavError> {
        self.document
            .borrow_mut()
            .history
            .push((state.clone(), url.to_string()));
        Ok(())
    }

    fn assign_location(&self, url: &str) {
        self.document
            .borrow_mut()
            .assigned_locations
            .push(url.to_string());
    }
}

#[derive(Debug, Clone)]
enum StaticResponse {
    Page(String),
    Status(StatusCode),
    NetworkError(String),
}

/// Serves static files from a map. Unknown files answer 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    files: BTreeMap<String, StaticResponse>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, file: &str, html: &str) -> Self {
        self.files
            .insert(file.to_string(), StaticResponse::Page(html.to_string()));
        self
    }

    pub fn with_status(mut self, file: &str, status: StatusCode) -> Self {
        self.files
            .insert(file.to_string(), StaticResponse::Status(status));
        self
    }

    pub fn with_network_error(mut self, file: &str, message: &str) -> Self {
        self.files.insert(
            file.to_string(),
            StaticResponse::NetworkError(message.to_string()),
        );
        self
    }

    /// Files requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub(crate) fn respond(&self, file: &str) -> Result<String, NavError> {
        self.requests.borrow_mut().push(file.to_string());
        match self.files.get(file) {
            Some(StaticResponse::Page(html)) => Ok(html.clone()),
            Some(StaticResponse::Status(status)) => Err(NavError::Status {
                file: file.to_string(),
                status: *status,
            }),
            Some(StaticResponse::NetworkError(message)) => Err(NavError::Fetch(message.clone())),
            None => Err(NavError::Status {
                file: file.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

impl PageFetcher for StaticFetcher {
    async fn fetch_page(&self, file: &str) -> Result<String, NavError> {
        self.respond(file)
    }
}
