use std::env;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "OXDB_BASE_URL";

/// Connection settings for a [`crate::PushClient`].
///
/// The base URL is fixed at construction and only readable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `OXDB_BASE_URL`, falling back to [`DEFAULT_BASE_URL`] when unset or empty.
    pub fn from_env() -> Self {
        Self::from_base_url_var(env::var(BASE_URL_ENV).ok())
    }

    fn from_base_url_var(value: Option<String>) -> Self {
        match value {
            Some(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
