//! The navigation interceptor.
//!
//! [`Router`] owns the tab-local navigation state (current path, bind-once flag, load generation)
//! and drives a [`PageHost`] and a [`PageFetcher`]. It never reaches for ambient globals: whoever
//! bootstraps the page constructs it and keeps it alive.
//!
//! ## Overlapping loads
//!
//! Every call to [`Router::load`] takes a fresh generation token before it fetches. When the
//! fetch resolves and a newer load has started in the meantime, the older load is
//! [`LoadOutcome::Superseded`]: it leaves the document, history and location untouched and lets
//! the newer load own the loading class.

use crate::{
    config::RouterConfig,
    error::NavError,
    host::{NavState, PageFetcher, PageHost, PostSwapHook},
    link::{classify, LinkKind},
    page::FetchedPage,
    paths::{file_for_path, join_base, needs_reconciliation},
};
use scraper::Selector;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};
use url::Url;

/// How a navigation request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Content for `path` was spliced into the document.
    Applied { path: String, file: String },
    /// The requested path is already displayed.
    Unchanged,
    /// A newer load started before this one's fetch resolved.
    Superseded,
    /// The load failed and the browser was sent to `file` directly.
    FellBack { file: String, error: NavError },
}

impl LoadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOutcome::Applied { .. } => "applied",
            LoadOutcome::Unchanged => "unchanged",
            LoadOutcome::Superseded => "superseded",
            LoadOutcome::FellBack { .. } => "fell-back",
        }
    }
}

/// Removes the loading class when the load holding `token` is still the newest one.
struct LoadingGuard<'a, H: PageHost> {
    host: &'a H,
    class: &'a str,
    generation: &'a Cell<u64>,
    token: u64,
}

impl<H: PageHost> Drop for LoadingGuard<'_, H> {
    fn drop(&mut self) {
        if self.generation.get() == self.token {
            self.host.remove_body_class(self.class);
        }
    }
}

pub struct Router<H, F> {
    config: RouterConfig,
    container: Selector,
    host: H,
    fetcher: F,
    hooks: RefCell<Vec<Rc<dyn PostSwapHook>>>,
    current_path: RefCell<String>,
    bound: Cell<bool>,
    generation: Cell<u64>,
}

impl<H: PageHost, F: PageFetcher> Router<H, F> {
    /// Build a router for a document currently showing `location`.
    pub fn new(
        config: RouterConfig,
        host: H,
        fetcher: F,
        location: &Url,
    ) -> Result<Router<H, F>, NavError> {
        config.validate()?;
        let container = config.selector()?;
        tracing::debug!(
            "Router::new: starting at '{}' with container '{}'",
            location.path(),
            config.content_selector
        );
        Ok(Router {
            config,
            container,
            host,
            fetcher,
            hooks: RefCell::new(Vec::new()),
            current_path: RefCell::new(location.path().to_string()),
            bound: Cell::new(false),
            generation: Cell::new(0),
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn current_path(&self) -> String {
        self.current_path.borrow().clone()
    }

    /// Number of loads started so far.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Returns true the first time it is called and false afterwards. Listener binding is gated
    /// on it.
    pub fn mark_bound(&self) -> bool {
        !self.bound.replace(true)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.get()
    }

    /// Register a hook run after every successful swap. A hook registered while hooks are
    /// running takes effect from the next swap.
    pub fn add_hook(&self, hook: Box<dyn PostSwapHook>) {
        tracing::debug!("Router::add_hook: registered '{}'", hook.name());
        self.hooks.borrow_mut().push(Rc::from(hook));
    }

    /// Path an anchor click should navigate to, or None when the browser should handle it.
    pub fn link_target(
        &self,
        href: Option<&str>,
        target: Option<&str>,
        document_url: &Url,
    ) -> Option<String> {
        match classify(href, target, document_url) {
            LinkKind::Internal { path } => Some(path),
            LinkKind::External(reason) => {
                tracing::debug!("Router::link_target: skipping {:?} ({:?})", href, reason);
                None
            }
        }
    }

    /// Show `path`, pushing a history entry. Navigating to the displayed path does nothing.
    pub async fn navigate(&self, path: &str) -> LoadOutcome {
        if self.current_path() == path {
            tracing::debug!("Router::navigate: '{}' already displayed", path);
            return LoadOutcome::Unchanged;
        }
        self.current_path.replace(path.to_string());
        self.load(path, true).await
    }

    /// Fetch the static file behind `path` and splice its content into the document.
    pub async fn load(&self, path: &str, update_history: bool) -> LoadOutcome {
        let file = file_for_path(path);
        let token = self.generation.get() + 1;
        self.generation.set(token);

        self.host.add_body_class(&self.config.loading_class);
        let _loading = LoadingGuard {
            host: &self.host,
            class: &self.config.loading_class,
            generation: &self.generation,
            token,
        };

        let fetched = self.fetcher.fetch_page(&file).await;
        if self.generation.get() != token {
            tracing::debug!(
                "Router::load: load {} of '{}' superseded by load {}",
                token,
                path,
                self.generation.get()
            );
            return LoadOutcome::Superseded;
        }

        match fetched.and_then(|html| self.apply(path, &html, update_history)) {
            Ok(()) => {
                self.run_hooks();
                tracing::info!("Navigated to '{}' ({})", path, file);
                LoadOutcome::Applied {
                    path: path.to_string(),
                    file,
                }
            }
            Err(error) => {
                let fallback = join_base(&self.config.base_url, &file);
                tracing::error!(
                    "Failed to load '{}': {}. Falling back to {}",
                    path,
                    error,
                    fallback
                );
                self.host.assign_location(&fallback);
                LoadOutcome::FellBack { file, error }
            }
        }
    }

    fn apply(&self, path: &str, html: &str, update_history: bool) -> Result<(), NavError> {
        let page = FetchedPage::parse(html, &self.container);
        self.host
            .set_container_html(&self.config.content_selector, &page.fragment)?;
        self.host.scroll_to_top();

        if let Some(title) = &page.title {
            self.host.set_title(title);
        }
        if let Some(href) = &page.canonical {
            if !self.host.set_canonical_href(href) {
                tracing::debug!("Router::apply: live document has no canonical link");
            }
        }
        if let Some(url) = &page.og_url {
            if !self.host.set_og_url(url) {
                tracing::debug!("Router::apply: live document has no og:url meta tag");
            }
        }

        if update_history {
            let url = join_base(&self.config.base_url, path);
            self.host.push_history(
                &NavState {
                    path: path.to_string(),
                },
                &url,
            )?;
        }
        Ok(())
    }

    fn run_hooks(&self) {
        let hooks = self.hooks.borrow().clone();
        for hook in hooks {
            if let Err(e) = hook.after_swap(&self.config.content_selector) {
                tracing::warn!("Post-swap hook '{}' failed: {}", hook.name(), e);
            }
        }
    }

    /// Startup check for a clean URL served straight from the server.
    ///
    /// When the document title does not match the title expected for `location`, the right
    /// content is loaded in place. The URL is already correct, so no history entry is pushed.
    pub async fn reconcile(&self, location: &Url) -> Option<LoadOutcome> {
        let path = location.path();
        let has_fragment = location.fragment().is_some_and(|f| !f.is_empty());
        if !needs_reconciliation(path, has_fragment) {
            return None;
        }
        let expected = self.config.expected_title(path);
        let actual = self.host.title();
        if actual == expected {
            return None;
        }
        tracing::info!(
            "Title '{}' does not match expected '{}' for '{}', reloading content",
            actual,
            expected,
            path
        );
        Some(self.load(path, false).await)
    }

    /// Back/forward navigation. The browser has already moved the URL and the history stack.
    pub async fn pop_state(&self, state: Option<NavState>) -> Option<LoadOutcome> {
        let NavState { path } = state?;
        self.current_path.replace(path.clone());
        Some(self.load(&path, false).await)
    }
}
