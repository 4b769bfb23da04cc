//! WASM bindings for clean-nav
//!
//! Binds the [`Router`] to the live browser document: a capture-phase click listener on the
//! document, a `popstate` listener on the window, `fetch` for static pages and the History API
//! for clean URLs.
//!
//! ## Usage
//!
//! ```javascript,ignore
//! import init, { install, installFromPage } from './clean_nav.js';
//!
//! async function main() {
//!     await init();
//!
//!     // Explicit configuration (any omitted field keeps its default)
//!     const nav = await install({
//!         content_selector: '#main-content',
//!         loading_class: 'page-loading',
//!     });
//!
//!     // Or read JSON from <script type="application/json" id="clean-nav-config">
//!     // const nav = await installFromPage();
//!
//!     // Re-bind widgets living inside the swapped container
//!     nav.addHook('dropdowns', (selector) => {
//!         if (window.jQuery) window.jQuery(selector + ' .dropdown-toggle').dropdown();
//!     });
//!
//!     // Keep listeners for the lifetime of the page
//!     nav.forget();
//! }
//! ```
//!
//! The returned `NavHandle` owns the listeners. `uninstall()` (or freeing the handle) removes
//! them; `forget()` leaves them bound for the rest of the page's life.

use crate::{
    config::{RouterConfig, CONFIG_SCRIPT_ID},
    error::NavError,
    host::{NavState, PageFetcher, PageHost, PostSwapHook},
    paths::{file_for_path, join_base},
    router::Router,
};
use http::StatusCode;
use js_sys::{Function, Promise};
use std::{cell::Cell, rc::Rc, sync::Once};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};
use web_sys::{
    console, AddEventListenerOptions, Document, Element, Event, Node, PopStateEvent, Response,
    Window,
};

type BrowserRouter = Router<BrowserHost, BrowserFetcher>;

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn dom_error(context: &str, value: JsValue) -> NavError {
    NavError::Dom(format!("{context}: {}", describe(&value)))
}

/// Route `tracing` output to the browser console. Safe to call more than once.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if let Err(e) = tracing_wasm::try_set_as_global_default() {
            console::warn_1(&format!("⚠️ tracing subscriber already installed: {e}").into());
        }
    });
}

/// [`PageHost`] over the real window and document.
pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new() -> Result<BrowserHost, NavError> {
        let window = web_sys::window().ok_or_else(|| NavError::Dom("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| NavError::Dom("window has no document".to_string()))?;
        Ok(BrowserHost { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Full URL of the active location.
    pub fn location_url(&self) -> Result<Url, NavError> {
        let href = self
            .window
            .location()
            .href()
            .map_err(|e| dom_error("location.href", e))?;
        Ok(Url::parse(&href)?)
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    /// Give the entry the page was loaded with a state, so navigating back to it is handled like
    /// any other entry.
    fn seed_history(&self, path: &str) -> Result<(), NavError> {
        let history = self
            .window
            .history()
            .map_err(|e| dom_error("window.history", e))?;
        let current = history.state().map_err(|e| dom_error("history.state", e))?;
        if !(current.is_null() || current.is_undefined()) {
            return Ok(());
        }
        let state = serde_wasm_bindgen::to_value(&NavState {
            path: path.to_string(),
        })?;
        history
            .replace_state(&state, "")
            .map_err(|e| dom_error("history.replaceState", e))
    }

    fn read_page_config(&self) -> Result<RouterConfig, NavError> {
        match self
            .document
            .get_element_by_id(CONFIG_SCRIPT_ID)
            .and_then(|script| script.text_content())
        {
            Some(json) if !json.trim().is_empty() => RouterConfig::from_json_str(&json),
            _ => {
                tracing::debug!("No #{} element, using default configuration", CONFIG_SCRIPT_ID);
                Ok(RouterConfig::default())
            }
        }
    }
}

impl PageHost for BrowserHost {
    fn set_container_html(&self, selector: &str, html: &str) -> Result<(), NavError> {
        let container = self
            .document
            .query_selector(selector)
            .map_err(|e| dom_error("querySelector", e))?
            .ok_or_else(|| NavError::Dom(format!("no element matches '{selector}'")))?;
        container.set_inner_html(html);
        Ok(())
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn set_canonical_href(&self, href: &str) -> bool {
        self.query(r#"link[rel="canonical"]"#)
            .map(|link| link.set_attribute("href", href).is_ok())
            .unwrap_or(false)
    }

    fn set_og_url(&self, url: &str) -> bool {
        self.query(r#"meta[property="og:url"]"#)
            .map(|meta| meta.set_attribute("content", url).is_ok())
            .unwrap_or(false)
    }

    fn add_body_class(&self, class: &str) {
        if let Some(body) = self.document.body() {
            if let Err(e) = body.class_list().add_1(class) {
                tracing::warn!("Could not add body class '{}': {}", class, describe(&e));
            }
        }
    }

    fn remove_body_class(&self, class: &str) {
        if let Some(body) = self.document.body() {
            if let Err(e) = body.class_list().remove_1(class) {
                tracing::warn!("Could not remove body class '{}': {}", class, describe(&e));
            }
        }
    }

    fn push_history(&self, state: &NavState, url: &str) -> Result<(), NavError> {
        let state = serde_wasm_bindgen::to_value(state)?;
        self.window
            .history()
            .map_err(|e| dom_error("window.history", e))?
            .push_state_with_url(&state, "", Some(url))
            .map_err(|e| dom_error("history.pushState", e))
    }

    fn assign_location(&self, url: &str) {
        if let Err(e) = self.window.location().set_href(url) {
            console::error_1(&format!("❌ Could not navigate to {url}: {}", describe(&e)).into());
        }
    }
}

/// [`PageFetcher`] backed by `window.fetch`.
pub struct BrowserFetcher {
    window: Window,
    base_url: String,
}

impl BrowserFetcher {
    pub fn new(window: Window, base_url: &str) -> Self {
        BrowserFetcher {
            window,
            base_url: base_url.to_string(),
        }
    }
}

impl PageFetcher for BrowserFetcher {
    async fn fetch_page(&self, file: &str) -> Result<String, NavError> {
        let url = join_base(&self.base_url, file);
        let response = JsFuture::from(self.window.fetch_with_str(&url))
            .await
            .map_err(|e| NavError::Fetch(format!("{url}: {}", describe(&e))))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| NavError::Fetch(format!("{url}: fetch did not yield a Response")))?;
        if !response.ok() {
            return Err(NavError::Status {
                file: file.to_string(),
                status: StatusCode::from_u16(response.status())?,
            });
        }
        let body = response
            .text()
            .map_err(|e| NavError::Fetch(format!("{url}: {}", describe(&e))))?;
        JsFuture::from(body)
            .await
            .map_err(|e| NavError::Fetch(format!("{url}: {}", describe(&e))))?
            .as_string()
            .ok_or_else(|| NavError::Fetch(format!("{url}: body is not text")))
    }
}

/// [`PostSwapHook`] calling a JavaScript function with the container selector.
pub struct JsHook {
    name: String,
    function: Function,
}

impl JsHook {
    pub fn new(name: String, function: Function) -> Self {
        JsHook { name, function }
    }
}

impl PostSwapHook for JsHook {
    fn name(&self) -> &str {
        &self.name
    }

    fn after_swap(&self, container_selector: &str) -> Result<(), NavError> {
        self.function
            .call1(&JsValue::NULL, &JsValue::from_str(container_selector))
            .map(|_| ())
            .map_err(|e| NavError::Hook {
                name: self.name.clone(),
                message: describe(&e),
            })
    }
}

/// Resolves once the document has finished parsing.
async fn document_ready(document: &Document) -> Result<(), NavError> {
    if document.ready_state() != "loading" {
        return Ok(());
    }
    let ready = Promise::new(&mut |resolve, _reject| {
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        if let Err(e) = document.add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            &resolve,
            &options,
        ) {
            console::error_1(&format!("❌ Could not wait for DOMContentLoaded: {}", describe(&e)).into());
        }
    });
    JsFuture::from(ready)
        .await
        .map(|_| ())
        .map_err(|e| dom_error("DOMContentLoaded", e))
}

/// Nearest anchor at or above the click target.
fn anchor_from_event(event: &Event) -> Option<Element> {
    let target = event.target()?;
    let element = match target.dyn_into::<Element>() {
        Ok(element) => element,
        Err(target) => target.dyn_into::<Node>().ok()?.parent_element()?,
    };
    element.closest("a").ok().flatten()
}

/// Cancel the default action of a click on an internal link and return the path to show.
fn intercept_click(router: &BrowserRouter, event: &Event) -> Option<String> {
    if event.default_prevented() {
        return None;
    }
    let anchor = anchor_from_event(event)?;
    let document_url = match router.host().location_url() {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Ignoring click, location unavailable: {}", e);
            return None;
        }
    };
    let href = anchor.get_attribute("href");
    let target = anchor.get_attribute("target");
    let path = router.link_target(href.as_deref(), target.as_deref(), &document_url)?;
    event.prevent_default();
    Some(path)
}

fn on_click(router: &Rc<BrowserRouter>, event: Event) {
    let Some(path) = intercept_click(router, &event) else {
        return;
    };
    let router = router.clone();
    spawn_local(async move {
        router.navigate(&path).await;
    });
}

/// Router state carried by a history entry. Entries pushed by other scripts yield None.
fn nav_state_from(event: &PopStateEvent) -> Option<NavState> {
    let state = event.state();
    if state.is_null() || state.is_undefined() {
        return None;
    }
    match serde_wasm_bindgen::from_value::<NavState>(state) {
        Ok(nav_state) => Some(nav_state),
        Err(e) => {
            tracing::debug!("Ignoring foreign history state: {}", e);
            None
        }
    }
}

fn on_pop_state(router: &Rc<BrowserRouter>, event: PopStateEvent) {
    let nav_state = nav_state_from(&event);
    let router = router.clone();
    spawn_local(async move {
        router.pop_state(nav_state).await;
    });
}

fn remove_click_listener(document: &Document, click: &Closure<dyn FnMut(Event)>) {
    if let Err(e) = document.remove_event_listener_with_callback_and_bool(
        "click",
        click.as_ref().unchecked_ref(),
        true,
    ) {
        tracing::warn!("Could not remove click listener: {}", describe(&e));
    }
}

thread_local! {
    static INSTALLED: Cell<bool> = const { Cell::new(false) };
}

/// Reserve the page for a single installed router.
fn claim_page() -> Result<(), NavError> {
    if INSTALLED.with(|installed| installed.replace(true)) {
        return Err(NavError::Config(
            "navigation is already installed on this page; uninstall the previous handle first"
                .to_string(),
        ));
    }
    Ok(())
}

fn release_page() {
    INSTALLED.with(|installed| installed.set(false));
}

/// Registered event listeners, removed on drop unless forgotten.
struct Listeners {
    window: Window,
    document: Document,
    click: Closure<dyn FnMut(Event)>,
    popstate: Closure<dyn FnMut(PopStateEvent)>,
}

impl Listeners {
    fn bind(router: &Rc<BrowserRouter>) -> Result<Listeners, NavError> {
        if !router.mark_bound() {
            return Err(NavError::Config(
                "navigation listeners already bound".to_string(),
            ));
        }
        let window = router.host().window().clone();
        let document = router.host().document().clone();

        let click = {
            let router = router.clone();
            Closure::<dyn FnMut(Event)>::new(move |event: Event| on_click(&router, event))
        };
        document
            .add_event_listener_with_callback_and_bool("click", click.as_ref().unchecked_ref(), true)
            .map_err(|e| dom_error("addEventListener(click)", e))?;

        let popstate = {
            let router = router.clone();
            Closure::<dyn FnMut(PopStateEvent)>::new(move |event: PopStateEvent| {
                on_pop_state(&router, event)
            })
        };
        if let Err(e) =
            window.add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())
        {
            remove_click_listener(&document, &click);
            return Err(dom_error("addEventListener(popstate)", e));
        }

        Ok(Listeners {
            window,
            document,
            click,
            popstate,
        })
    }

    fn unbind(&self) {
        remove_click_listener(&self.document, &self.click);
        if let Err(e) = self
            .window
            .remove_event_listener_with_callback("popstate", self.popstate.as_ref().unchecked_ref())
        {
            tracing::warn!("Could not remove popstate listener: {}", describe(&e));
        }
    }

    fn forget(self) {
        let Listeners {
            click, popstate, ..
        } = self;
        click.forget();
        popstate.forget();
    }
}

/// Handle to an installed router. Owns the document and window listeners.
#[wasm_bindgen]
pub struct NavHandle {
    router: Rc<BrowserRouter>,
    /// None once uninstalled or forgotten.
    listeners: Option<Listeners>,
}

#[wasm_bindgen]
impl NavHandle {
    /// The clean path currently displayed.
    #[wasm_bindgen(getter, js_name = currentPath)]
    pub fn current_path(&self) -> String {
        self.router.current_path()
    }

    /// Navigate programmatically. Resolves to "applied", "unchanged", "superseded" or
    /// "fell-back".
    #[wasm_bindgen]
    pub fn navigate(&self, path: String) -> Promise {
        let router = self.router.clone();
        future_to_promise(async move {
            let outcome = router.navigate(&path).await;
            Ok(JsValue::from_str(outcome.as_str()))
        })
    }

    /// Register a function run after every content swap with the container selector.
    ///
    /// # JavaScript Example
    /// ```javascript,ignore
    /// nav.addHook('aos', () => window.AOS && window.AOS.refreshHard());
    /// ```
    #[wasm_bindgen(js_name = addHook)]
    pub fn add_hook(&self, name: String, hook: Function) {
        self.router.add_hook(Box::new(JsHook::new(name, hook)));
    }

    /// Remove the click and popstate listeners. The router stops intercepting navigation.
    #[wasm_bindgen]
    pub fn uninstall(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            listeners.unbind();
            release_page();
            tracing::info!("Navigation listeners removed");
        }
    }

    /// Keep the listeners bound for the rest of the page's life and release the handle. The page
    /// stays claimed, so later `install` calls are rejected.
    #[wasm_bindgen]
    pub fn forget(self) {
        let mut handle = self;
        if let Some(listeners) = handle.listeners.take() {
            listeners.forget();
        }
    }
}

impl Drop for NavHandle {
    fn drop(&mut self) {
        self.uninstall();
    }
}

async fn bootstrap(host: BrowserHost, config: RouterConfig) -> Result<NavHandle, NavError> {
    claim_page()?;
    let bound = bind_router(host, config);
    if bound.is_err() {
        release_page();
    }
    let (router, listeners, location) = bound?;

    let reconciling = router.clone();
    spawn_local(async move {
        reconciling.reconcile(&location).await;
    });

    tracing::info!("Navigation installed at '{}'", router.current_path());
    Ok(NavHandle {
        router,
        listeners: Some(listeners),
    })
}

fn bind_router(
    host: BrowserHost,
    config: RouterConfig,
) -> Result<(Rc<BrowserRouter>, Listeners, Url), NavError> {
    let location = host.location_url()?;
    let fetcher = BrowserFetcher::new(host.window().clone(), &config.base_url);
    if let Err(e) = host.seed_history(location.path()) {
        tracing::warn!("Could not seed history state: {}", e);
    }
    let router = Rc::new(Router::new(config, host, fetcher, &location)?);
    let listeners = Listeners::bind(&router)?;
    Ok((router, listeners, location))
}

/// Install navigation with `config` (a plain object; `undefined` uses defaults).
///
/// Waits for the document to finish parsing, binds the listeners and runs startup
/// reconciliation. Only one router may be installed per page: a second call is rejected until
/// the live handle is uninstalled or freed.
#[wasm_bindgen]
pub async fn install(config: JsValue) -> Result<NavHandle, JsValue> {
    init_tracing();
    let config = if config.is_null() || config.is_undefined() {
        RouterConfig::default()
    } else {
        serde_wasm_bindgen::from_value::<RouterConfig>(config).map_err(NavError::from)?
    };
    let host = BrowserHost::new()?;
    document_ready(host.document()).await?;
    Ok(bootstrap(host, config).await?)
}

/// Install navigation configured from the page's `#clean-nav-config` JSON script element.
#[wasm_bindgen(js_name = installFromPage)]
pub async fn install_from_page() -> Result<NavHandle, JsValue> {
    init_tracing();
    let host = BrowserHost::new()?;
    document_ready(host.document()).await?;
    let config = host.read_page_config()?;
    Ok(bootstrap(host, config).await?)
}

/// Static file backing a clean path, e.g. `/donate` → `donate.html`.
#[wasm_bindgen(js_name = fileForPath)]
pub fn file_for_path_js(path: &str) -> String {
    file_for_path(path)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use wasm_bindgen_test::*;
    use web_sys::{EventInit, PopStateEventInit};

    wasm_bindgen_test_configure!(run_in_browser);

    fn browser_router() -> Rc<BrowserRouter> {
        let host = BrowserHost::new().unwrap();
        let location = host.location_url().unwrap();
        let fetcher = BrowserFetcher::new(host.window().clone(), "");
        Rc::new(Router::new(RouterConfig::default(), host, fetcher, &location).unwrap())
    }

    fn prepare_links(router: &BrowserRouter) {
        router.host().document().body().unwrap().set_inner_html(
            r#"<a id="inside" href="/x"><span id="label">X</span></a>
<a id="blank" href="/y" target="_blank">Y</a>"#,
        );
    }

    fn element(router: &BrowserRouter, id: &str) -> Element {
        router.host().document().get_element_by_id(id).unwrap()
    }

    /// Dispatch a cancelable click on `target` and run the interception from a document
    /// capture listener. Returns the intercepted path and whether the default was prevented.
    fn dispatch_click(
        router: &Rc<BrowserRouter>,
        target: &Element,
        prevented_earlier: bool,
    ) -> (Option<String>, bool) {
        let window = router.host().window().clone();
        let document = router.host().document().clone();
        let intercepted = Rc::new(RefCell::new(None));

        let early = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if prevented_earlier {
                event.prevent_default();
            }
        });
        window
            .add_event_listener_with_callback_and_bool("click", early.as_ref().unchecked_ref(), true)
            .unwrap();

        let listener = {
            let router = router.clone();
            let intercepted = intercepted.clone();
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                *intercepted.borrow_mut() = intercept_click(&router, &event);
            })
        };
        document
            .add_event_listener_with_callback_and_bool(
                "click",
                listener.as_ref().unchecked_ref(),
                true,
            )
            .unwrap();

        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let event = Event::new_with_event_init_dict("click", &init).unwrap();
        target.dispatch_event(&event).unwrap();

        remove_click_listener(&document, &listener);
        window
            .remove_event_listener_with_callback_and_bool("click", early.as_ref().unchecked_ref(), true)
            .unwrap();

        let path = intercepted.borrow_mut().take();
        (path, event.default_prevented())
    }

    fn pop_state_event(state: &JsValue) -> PopStateEvent {
        let init = PopStateEventInit::new();
        init.set_state(state);
        PopStateEvent::new_with_event_init_dict("popstate", &init).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_click_inside_anchor_is_intercepted() {
        let router = browser_router();
        prepare_links(&router);
        let (path, prevented) = dispatch_click(&router, &element(&router, "label"), false);
        assert_eq!(path.as_deref(), Some("/x"));
        assert!(prevented);
    }

    #[wasm_bindgen_test]
    fn test_click_already_prevented_is_ignored() {
        let router = browser_router();
        prepare_links(&router);
        let (path, prevented) = dispatch_click(&router, &element(&router, "label"), true);
        assert_eq!(path, None);
        assert!(prevented, "Default stays prevented by the earlier handler");
    }

    #[wasm_bindgen_test]
    fn test_click_on_new_window_link_passes_through() {
        let router = browser_router();
        prepare_links(&router);
        let (path, prevented) = dispatch_click(&router, &element(&router, "blank"), false);
        assert_eq!(path, None);
        assert!(!prevented);
    }

    #[wasm_bindgen_test]
    async fn test_foreign_history_state_is_ignored() {
        let router = browser_router();

        let foreign = js_sys::Object::new();
        js_sys::Reflect::set(&foreign, &"scroll".into(), &JsValue::from_f64(120.0)).unwrap();
        let state = nav_state_from(&pop_state_event(&foreign));
        assert_eq!(state, None);
        assert_eq!(nav_state_from(&pop_state_event(&JsValue::NULL)), None);

        let path_before = router.current_path();
        assert_eq!(router.pop_state(state).await, None);
        assert_eq!(router.current_path(), path_before);
        assert_eq!(router.generation(), 0);

        let ours = serde_wasm_bindgen::to_value(&NavState {
            path: "/donate".to_string(),
        })
        .unwrap();
        assert_eq!(
            nav_state_from(&pop_state_event(&ours)),
            Some(NavState {
                path: "/donate".to_string()
            })
        );
    }

    #[wasm_bindgen_test]
    async fn test_missing_file_is_a_status_error() {
        let router = browser_router();
        let err = router
            .fetcher()
            .fetch_page("clean-nav-no-such-page.html")
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::Status { .. }), "got {err:?}");
        assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));
    }

    #[wasm_bindgen_test]
    fn test_page_accepts_one_install_at_a_time() {
        claim_page().unwrap();
        assert!(matches!(claim_page(), Err(NavError::Config(_))));
        release_page();
        claim_page().unwrap();
        release_page();
    }
}
