use http::status::{InvalidStatusCode, StatusCode};
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[cfg(feature = "wasm")]
use serde_wasm_bindgen::Error as WasmError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error("Invalid router configuration: {0}")]
    Config(String),
    #[error("Document error: {0}")]
    Dom(String),
    #[error("Network fetch failed: {0}")]
    Fetch(String),
    #[error("Post-swap hook '{name}' failed: {message}")]
    Hook { name: String, message: String },
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Fetch of '{file}' returned {status}")]
    Status { file: String, status: StatusCode },
    #[error("Invalid URL: {0}")]
    Url(String),
}

impl NavError {
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            NavError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<UrlParseError> for NavError {
    fn from(src: UrlParseError) -> NavError {
        NavError::Url(format!("{src}"))
    }
}

impl From<InvalidStatusCode> for NavError {
    fn from(src: InvalidStatusCode) -> NavError {
        NavError::Fetch(format!("Invalid HTTP status: {src}"))
    }
}

impl From<toml::de::Error> for NavError {
    fn from(src: toml::de::Error) -> NavError {
        NavError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<JsonError> for NavError {
    fn from(src: JsonError) -> NavError {
        NavError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

#[cfg(feature = "wasm")]
impl From<WasmError> for NavError {
    fn from(wasm_error: WasmError) -> Self {
        NavError::Serialization(format!("Serde-wasm-bindgen error: {wasm_error}"))
    }
}

#[cfg(feature = "wasm")]
impl From<NavError> for wasm_bindgen::JsValue {
    fn from(error: NavError) -> Self {
        wasm_bindgen::JsValue::from_str(&error.to_string())
    }
}
