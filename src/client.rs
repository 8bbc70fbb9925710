use crate::config::Config;
use crate::constants::{AUTH_USERNAME, JSON_MEDIA_TYPE};
use crate::error::{Result, TinifyError};
use crate::transport::{resolve_proxy, ProcessEnv, ProxyCandidates, ProxyRoute, Transport};
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Body of a request to the Tinify API.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Raw image bytes.
    Raw(Vec<u8>),
    /// A JSON object, sent with `Content-Type: application/json`.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Serializes `value` into a JSON body.
    ///
    /// # Errors
    /// * `TinifyError::Validation` if `value` does not serialize to a JSON object
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| TinifyError::validation(format!("invalid request body: {}", e)))?;
        if !value.is_object() {
            return Err(TinifyError::validation(
                "invalid request body; must be either an image or a JSON object",
            ));
        }
        Ok(RequestBody::Json(value))
    }

    fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Raw(bytes) => bytes.is_empty(),
            RequestBody::Json(value) => value.as_object().map_or(true, |map| map.is_empty()),
        }
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Raw(bytes)
    }
}

/// Authenticated client for the Tinify API.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    proxy: Option<String>,
    transport: Arc<Transport>,
}

impl Client {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            proxy: None,
            transport: Arc::new(Transport::new()),
        }
    }

    /// Creates a client with its own proxy, used when the configuration has none.
    pub fn with_proxy(config: Config, proxy: impl Into<String>) -> Self {
        let mut client = Self::new(config);
        client.set_proxy(Some(proxy.into()));
        client
    }

    pub fn set_proxy(&mut self, proxy: Option<String>) {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Prefixes relative paths with the configured endpoint.
    pub fn resolve_url(&self, path_or_url: &str) -> String {
        if looks_absolute(path_or_url) {
            path_or_url.to_string()
        } else {
            format!("{}{}", self.config.endpoint(), path_or_url)
        }
    }

    /// Proxy route a request to `target` would take.
    pub fn proxy_route(&self, target: &Url, call_proxy: Option<&str>) -> ProxyRoute {
        let candidates = ProxyCandidates {
            global: self.config.proxy(),
            client: self.proxy(),
            call: call_proxy,
        };
        resolve_proxy(&candidates, &ProcessEnv, target)
    }

    /// Sends a request and returns the raw response; status codes are not interpreted.
    pub fn request(
        &self,
        method: Method,
        path_or_url: &str,
        body: RequestBody,
    ) -> Result<Response> {
        self.request_via(method, path_or_url, body, None)
    }

    /// Like [`request`](Self::request), with a proxy for this call only.
    pub fn request_via(
        &self,
        method: Method,
        path_or_url: &str,
        body: RequestBody,
        call_proxy: Option<&str>,
    ) -> Result<Response> {
        let target = self.resolve_url(path_or_url);
        let url = Url::parse(&target).map_err(|e| {
            TinifyError::validation(format!(
                "request to {:?} using method {:?} failed; error was: {}",
                target, method, e
            ))
        })?;

        let route = self.proxy_route(&url, call_proxy);
        let http = self.transport.client_for(&route)?;
        debug!("{} {} (proxy: {:?})", method, url, route.proxy_url().map(Url::as_str));

        let mut builder = http
            .request(method, url)
            .basic_auth(AUTH_USERNAME, Some(self.config.api_key()));

        let skip_payload = body.is_empty();
        match body {
            RequestBody::Empty => {}
            RequestBody::Raw(bytes) => {
                if !skip_payload {
                    trace!("sending {} raw bytes", bytes.len());
                    builder = builder.body(bytes);
                }
            }
            RequestBody::Json(value) => {
                if !skip_payload {
                    let payload = serde_json::to_vec(&value).map_err(|e| {
                        TinifyError::validation(format!("invalid request body: {}", e))
                    })?;
                    trace!("sending JSON body {}", value);
                    builder = builder.body(payload);
                }
                builder = builder.header(CONTENT_TYPE, JSON_MEDIA_TYPE);
            }
        }

        let response = builder.send()?;
        debug!("response status {}", response.status());
        Ok(response)
    }
}

fn looks_absolute(path_or_url: &str) -> bool {
    path_or_url
        .get(..8)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("https://"))
}
