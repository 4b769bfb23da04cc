use crate::error::NavError;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CONTENT_SELECTOR: &str = "#main-content";
pub const DEFAULT_LOADING_CLASS: &str = "page-loading";
pub const DEFAULT_TITLE: &str = "Open Doors Community";

/// Id of the `<script type="application/json">` element the browser bootstrapper reads its
/// configuration from.
pub const CONFIG_SCRIPT_ID: &str = "clean-nav-config";

/// Static, read-only router settings.
///
/// Every field falls back to its default when missing, so an empty TOML or JSON document is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefix for URLs pushed to history and for fallback navigations. Empty means
    /// origin-relative.
    pub base_url: String,
    /// CSS selector of the content container swapped on each navigation.
    pub content_selector: String,
    /// Class set on `<body>` while a load is in flight.
    pub loading_class: String,
    /// Title expected for clean paths missing from `titles`.
    pub default_title: String,
    /// Expected document title per clean path, consulted by startup reconciliation only.
    pub titles: BTreeMap<String, String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let titles = [
            ("/mission", "Our Mission | Open Doors Community"),
            ("/programs", "Programs | Open Doors Community"),
            ("/get-involved", "Get Involved | Open Doors Community"),
            ("/donate", "Donate | Open Doors Community"),
        ]
        .into_iter()
        .map(|(path, title)| (path.to_string(), title.to_string()))
        .collect();
        RouterConfig {
            base_url: String::new(),
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            loading_class: DEFAULT_LOADING_CLASS.to_string(),
            default_title: DEFAULT_TITLE.to_string(),
            titles,
        }
    }
}

impl RouterConfig {
    pub fn from_toml_str(content: &str) -> Result<RouterConfig, NavError> {
        let config: RouterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<RouterConfig, NavError> {
        let config: RouterConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), NavError> {
        if self.content_selector.trim().is_empty() {
            return Err(NavError::Config("content_selector is empty".to_string()));
        }
        self.selector()?;
        if self.loading_class.trim().is_empty() || self.loading_class.contains(char::is_whitespace)
        {
            return Err(NavError::Config(format!(
                "loading_class must be a single class name, got '{}'",
                self.loading_class
            )));
        }
        Ok(())
    }

    /// The content selector compiled for matching against fetched pages.
    pub fn selector(&self) -> Result<Selector, NavError> {
        Selector::parse(&self.content_selector).map_err(|e| {
            NavError::Config(format!(
                "content_selector '{}' does not parse: {:?}",
                self.content_selector, e
            ))
        })
    }

    /// Title the document should carry when `path` was served correctly.
    pub fn expected_title(&self, path: &str) -> &str {
        self.titles
            .get(path)
            .map(String::as_str)
            .unwrap_or(&self.default_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_default_config_is_valid() {
        let config = RouterConfig::default();
        config.validate().unwrap();
        assert_eq!(config.titles.len(), 4);
        assert!(config.base_url.is_empty());
    }

    #[test]
    fn test_expected_title_falls_back() {
        let config = RouterConfig::default();
        assert_eq!(
            config.expected_title("/donate"),
            "Donate | Open Doors Community"
        );
        assert_eq!(config.expected_title("/unlisted"), DEFAULT_TITLE);
        assert_eq!(config.expected_title("/donate/"), DEFAULT_TITLE);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RouterConfig::from_toml_str(
            r##"
base_url = "https://example.org"
content_selector = "#page"

[titles]
"/about" = "About"
"##,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://example.org");
        assert_eq!(config.content_selector, "#page");
        assert_eq!(config.loading_class, DEFAULT_LOADING_CLASS);
        assert_eq!(config.titles.len(), 1);
        assert_eq!(config.expected_title("/about"), "About");
    }

    #[test]
    fn test_from_json_empty_uses_defaults() {
        let config = RouterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let err = RouterConfig::from_json_str(r#"{"content_selector": ""}"#).unwrap_err();
        assert!(matches!(err, NavError::Config(_)));

        let err = RouterConfig::from_json_str("{\"content_selector\": \"##\"}").unwrap_err();
        assert!(matches!(err, NavError::Config(_)));

        let err = RouterConfig::from_json_str(r#"{"loading_class": "a b"}"#).unwrap_err();
        assert!(matches!(err, NavError::Config(_)));

        let err = RouterConfig::from_toml_str("base_url = 3").unwrap_err();
        assert!(matches!(err, NavError::Serialization(_)));
    }
}
