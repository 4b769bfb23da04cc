//! Internal-link classification.
//!
//! Decides whether a clicked anchor is handled in-page or left to the browser, and derives the
//! clean path an internal link points at.

use url::Url;

const NON_NAVIGATIONAL_SCHEMES: [&str; 2] = ["mailto:", "tel:"];

/// Why an anchor was left to default browser handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingHref,
    FragmentOnly,
    NonNavigational,
    NewWindow,
    CrossOrigin,
    Unresolvable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// Same-origin page link; `path` is the resolved path component only.
    Internal { path: String },
    External(SkipReason),
}

impl LinkKind {
    pub fn internal_path(&self) -> Option<&str> {
        match self {
            LinkKind::Internal { path } => Some(path),
            LinkKind::External(_) => None,
        }
    }
}

/// Classify an anchor from its raw `href` and `target` attributes.
///
/// `document_url` is the URL of the live document, used both as the resolution base and as the
/// reference origin.
pub fn classify(href: Option<&str>, target: Option<&str>, document_url: &Url) -> LinkKind {
    let href = match href.map(str::trim) {
        Some(href) if !href.is_empty() => href,
        _ => return LinkKind::External(SkipReason::MissingHref),
    };
    if href.starts_with('#') {
        return LinkKind::External(SkipReason::FragmentOnly);
    }
    let lowered = href.to_ascii_lowercase();
    if NON_NAVIGATIONAL_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return LinkKind::External(SkipReason::NonNavigational);
    }
    if target.is_some_and(|target| target.trim().eq_ignore_ascii_case("_blank")) {
        return LinkKind::External(SkipReason::NewWindow);
    }
    let resolved = match document_url.join(href) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::debug!("classify: could not resolve '{}': {}", href, e);
            return LinkKind::External(SkipReason::Unresolvable);
        }
    };
    if resolved.origin() != document_url.origin() {
        return LinkKind::External(SkipReason::CrossOrigin);
    }
    LinkKind::Internal {
        path: resolved.path().to_string(),
    }
}
