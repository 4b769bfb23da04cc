//! Extraction of swappable content and metadata from a fetched static page.

use crate::paths::strip_html_ext;
use scraper::{Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| unreachable!())
}

/// Everything the loader copies from a fetched page into the live document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedPage {
    /// Inner markup of the content container, or the whole response when the container is
    /// missing.
    pub fragment: String,
    /// True when the container was missing and `fragment` holds the entire response.
    pub degraded: bool,
    pub title: Option<String>,
    /// Canonical link target, with `.html` removed.
    pub canonical: Option<String>,
    /// Open Graph URL, with `.html` removed.
    pub og_url: Option<String>,
}

impl FetchedPage {
    /// Parse a fetched HTML document and pull out the content fragment and metadata.
    ///
    /// Never fails: a page without a matching container degrades to the full markup.
    pub fn parse(html: &str, container: &Selector) -> FetchedPage {
        let doc = Html::parse_document(html);

        let (fragment, degraded) = match doc.select(container).next() {
            Some(element) => (element.inner_html(), false),
            None => {
                tracing::warn!("FetchedPage::parse: content container not found, using full page");
                (html.to_string(), true)
            }
        };

        let title = doc
            .select(&selector("title"))
            .next()
            .map(|el| el.text().collect::<String>());

        let canonical = doc
            .select(&selector(r#"link[rel="canonical"]"#))
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(strip_html_ext);

        let og_url = doc
            .select(&selector(r#"meta[property="og:url"]"#))
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(strip_html_ext);

        FetchedPage {
            fragment,
            degraded,
            title,
            canonical,
            og_url,
        }
    }
}
