use crate::constants::{API_ENDPOINT, ENV_API_KEY, ENV_ENDPOINT, ENV_PROXY, MIN_API_KEY_LENGTH};
use crate::error::{Result, TinifyError};
use std::fmt;

/// Settings shared by every [`Client`](crate::Client) built from them.
///
/// The proxy configured here takes precedence over any per-client or
/// per-call proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_key: String,
    proxy: Option<String>,
    endpoint: String,
}

impl Config {
    /// Creates a configuration for the given API key.
    ///
    /// # Errors
    /// * `TinifyError::Configuration` if the key is missing or too short
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(TinifyError::Configuration(format!(
                "no API key provided; set {} or pass one explicitly",
                ENV_API_KEY
            )));
        }
        if api_key.len() < MIN_API_KEY_LENGTH {
            return Err(TinifyError::Configuration(format!(
                "invalid Tinify API key; too short (minimum {} characters)",
                MIN_API_KEY_LENGTH
            )));
        }

        Ok(Self {
            api_key,
            proxy: None,
            endpoint: API_ENDPOINT.to_string(),
        })
    }

    /// Reads the key, proxy and endpoint from the process environment.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(ENV_API_KEY).unwrap_or_default();
        let mut config = Self::new(key)?;
        if let Ok(proxy) = std::env::var(ENV_PROXY) {
            config = config.with_proxy(proxy);
        }
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            config = config.with_endpoint(endpoint)?;
        }
        Ok(config)
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        let proxy = proxy.into();
        self.proxy = if proxy.trim().is_empty() {
            None
        } else {
            Some(proxy.trim().to_string())
        };
        self
    }

    /// Overrides the service endpoint used for relative request paths.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(TinifyError::Configuration(
                "endpoint must not be empty".to_string(),
            ));
        }
        reqwest::Url::parse(endpoint).map_err(|e| {
            TinifyError::Configuration(format!("invalid endpoint {:?}: {}", endpoint, e))
        })?;
        self.endpoint = endpoint.to_string();
        Ok(self)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Last four characters of the key, for log lines.
    pub fn key_hint(&self) -> &str {
        let start = self
            .api_key
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.api_key[start..]
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &format_args!("[...{}]", self.key_hint()))
            .field("proxy", &self.proxy)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
