//! Clean URL path handling.
//!
//! A clean path is the logical location shown in the address bar (`/donate`). Every clean path is
//! backed by a static file (`donate.html`) that the loader fetches.
//!
//! | clean path          | static file         |
//! |---------------------|---------------------|
//! | `/`, ``             | `index.html`        |
//! | `/donate`           | `donate.html`       |
//! | `/donate?ref=x`     | `donate.html`       |
//! | `/get-involved#team`| `get-involved.html` |
//! | `/team/`            | `team/index.html`   |

/// File served for the site root and for directory-style paths.
pub const INDEX_FILE: &str = "index.html";

/// Extension every static page carries on disk and never carries in a clean URL.
pub const HTML_EXT: &str = ".html";

/// Map a clean path onto the static file that holds its content.
///
/// One leading `/` is removed, then any `?query` or `#fragment` suffix. Paths that already name an
/// `.html` file are returned unchanged so a stray `/page.html` link does not become
/// `page.html.html`.
pub fn file_for_path(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let stem = strip_suffixes(trimmed);
    let file = if stem.is_empty() {
        INDEX_FILE.to_string()
    } else if stem.ends_with('/') {
        format!("{stem}{INDEX_FILE}")
    } else if stem.ends_with(HTML_EXT) {
        stem.to_string()
    } else {
        format!("{stem}{HTML_EXT}")
    };
    tracing::debug!("file_for_path: mapped '{}' to '{}'", path, file);
    file
}

/// Drop the query string and fragment from a path.
pub fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Join the configured base URL with an absolute clean path.
///
/// `base` may carry a trailing slash and `path` may lack a leading one; exactly one `/` separates
/// them in the result. An empty base yields an origin-relative URL.
pub fn join_base(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Remove every literal `.html` occurrence from a URL-like value.
///
/// Used on canonical and Open Graph URLs copied out of fetched pages so the live document keeps
/// advertising clean URLs.
pub fn strip_html_ext(value: &str) -> String {
    value.replace(HTML_EXT, "")
}

/// Whether a location loaded directly from the server should be checked against the title table.
///
/// The root, explicit `.html` files and locations carrying a fragment are never reconciled.
pub fn needs_reconciliation(path: &str, has_fragment: bool) -> bool {
    !(path.is_empty() || path == "/" || path.contains(HTML_EXT) || has_fragment)
}
