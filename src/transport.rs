//! Proxy selection and the pooled HTTP transport behind every [`Client`](crate::Client).
//!
//! A proxy is chosen per request by walking a fixed precedence list: the
//! global proxy from [`Config`](crate::Config), the client's own proxy, a proxy
//! passed for the call, the usual proxy environment variables, and finally a
//! direct connection. The first value that parses wins; a malformed value is
//! logged and skipped.

use crate::constants::{CONNECT_TIMEOUT, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST};
use crate::error::Result;
use reqwest::Url;
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Source of environment variables consulted for proxy settings.
pub trait ProxyEnv {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProxyEnv for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<F> ProxyEnv for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Where a selected proxy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyOrigin {
    Global,
    Client,
    Call,
    Environment,
}

impl fmt::Display for ProxyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProxyOrigin::Global => "global",
            ProxyOrigin::Client => "client",
            ProxyOrigin::Call => "call",
            ProxyOrigin::Environment => "environment",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRoute {
    Direct,
    Via { url: Url, origin: ProxyOrigin },
}

impl ProxyRoute {
    pub fn proxy_url(&self) -> Option<&Url> {
        match self {
            ProxyRoute::Direct => None,
            ProxyRoute::Via { url, .. } => Some(url),
        }
    }

    pub fn origin(&self) -> Option<ProxyOrigin> {
        match self {
            ProxyRoute::Direct => None,
            ProxyRoute::Via { origin, .. } => Some(*origin),
        }
    }
}

/// Explicit proxy settings, highest precedence first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyCandidates<'a> {
    pub global: Option<&'a str>,
    pub client: Option<&'a str>,
    pub call: Option<&'a str>,
}

/// Picks the proxy for a request to `target`.
pub fn resolve_proxy(
    candidates: &ProxyCandidates<'_>,
    env: &dyn ProxyEnv,
    target: &Url,
) -> ProxyRoute {
    let explicit = [
        (candidates.global, ProxyOrigin::Global),
        (candidates.client, ProxyOrigin::Client),
        (candidates.call, ProxyOrigin::Call),
    ];
    for (value, origin) in explicit {
        if let Some(url) = value.and_then(|v| parse_proxy(v, origin)) {
            return ProxyRoute::Via { url, origin };
        }
    }

    match proxy_from_env(env, target) {
        Some(url) => ProxyRoute::Via {
            url,
            origin: ProxyOrigin::Environment,
        },
        None => ProxyRoute::Direct,
    }
}

fn parse_proxy(value: &str, origin: ProxyOrigin) -> Option<Url> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let candidate = if value.contains("://") {
        value.to_string()
    } else {
        format!("http://{}", value)
    };

    match Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some() => Some(url),
        Ok(_) => {
            warn!("{} proxy must be a valid URL; got {:?} which has no host", origin, value);
            None
        }
        Err(e) => {
            warn!("{} proxy must be a valid URL; got {:?} which gives error: {}", origin, value, e);
            None
        }
    }
}

fn proxy_from_env(env: &dyn ProxyEnv, target: &Url) -> Option<Url> {
    let host = target.host_str()?.to_ascii_lowercase();
    if is_loopback(&host) {
        return None;
    }

    let no_proxy = first_non_empty(env, &["NO_PROXY", "no_proxy"]).unwrap_or_default();
    if bypasses_proxy(&no_proxy, &host, target.port_or_known_default()) {
        debug!("host {} matched NO_PROXY, connecting directly", host);
        return None;
    }

    let scheme_vars: &[&str] = if target.scheme() == "https" {
        &["HTTPS_PROXY", "https_proxy"]
    } else {
        &["HTTP_PROXY", "http_proxy"]
    };

    scheme_vars
        .iter()
        .chain(["ALL_PROXY", "all_proxy"].iter())
        .filter_map(|name| env.var(name))
        .find_map(|value| parse_proxy(&value, ProxyOrigin::Environment))
}

fn first_non_empty(env: &dyn ProxyEnv, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env.var(name))
        .find(|value| !value.trim().is_empty())
}

fn is_loopback(host: &str) -> bool {
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}

/// Matches `host` against a comma-separated `NO_PROXY` list.
pub(crate) fn bypasses_proxy(no_proxy: &str, host: &str, port: Option<u16>) -> bool {
    for entry in no_proxy.split(',') {
        let entry = entry.trim().to_ascii_lowercase();
        if entry.is_empty() {
            continue;
        }
        if entry == "*" {
            return true;
        }

        let (entry_host, entry_port) = split_host_port(&entry);
        if let (Some(wanted), Some(actual)) = (entry_port, port) {
            if wanted != actual {
                continue;
            }
        }

        if let Some(suffix) = entry_host.strip_prefix('.') {
            if host == suffix || host.ends_with(&format!(".{}", suffix)) {
                return true;
            }
        } else if host == entry_host || host.ends_with(&format!(".{}", entry_host)) {
            return true;
        }
    }
    false
}

fn split_host_port(entry: &str) -> (&str, Option<u16>) {
    if let Some(rest) = entry.strip_prefix('[') {
        if let Some((ip, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
            return (ip, port);
        }
    }
    match entry.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host, Some(port)),
            Err(_) => (entry, None),
        },
        _ => (entry, None),
    }
}

/// Pooled HTTP clients, one per distinct proxy route.
///
/// Each underlying client is built on first use and reused for every later
/// request taking the same route.
#[derive(Default)]
pub struct Transport {
    clients: Mutex<HashMap<Option<Url>, reqwest::blocking::Client>>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_for(&self, route: &ProxyRoute) -> Result<reqwest::blocking::Client> {
        let key = route.proxy_url().cloned();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let client = build_client(route)?;
        debug!("built HTTP transport for route {:?}", route);
        clients.insert(key, client.clone());
        Ok(client)
    }

    /// Number of distinct transports built so far.
    pub fn pooled_routes(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("pooled_routes", &self.pooled_routes())
            .finish()
    }
}

fn build_client(route: &ProxyRoute) -> Result<reqwest::blocking::Client> {
    let builder = reqwest::blocking::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .timeout(None::<std::time::Duration>);

    let builder = match route {
        ProxyRoute::Direct => builder.no_proxy(),
        ProxyRoute::Via { url, .. } => builder.proxy(reqwest::Proxy::all(url.clone())?),
    };

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn api() -> Url {
        Url::parse("https://api.tinify.com/shrink").unwrap()
    }

    #[test]
    fn test_global_proxy_wins() {
        let candidates = ProxyCandidates {
            global: Some("http://global:1"),
            client: Some("http://client:2"),
            call: Some("http://call:3"),
        };
        let env = env_from(&[("HTTPS_PROXY", "http://env:4")]);
        let route = resolve_proxy(&candidates, &env, &api());
        assert_eq!(route.origin(), Some(ProxyOrigin::Global));
        assert_eq!(route.proxy_url().unwrap().host_str(), Some("global"));
    }

    #[test]
    fn test_malformed_proxy_falls_through() {
        let candidates = ProxyCandidates {
            global: Some("http://[broken"),
            client: Some("   "),
            call: Some("http://call:3"),
        };
        let env = env_from(&[]);
        let route = resolve_proxy(&candidates, &env, &api());
        assert_eq!(route.origin(), Some(ProxyOrigin::Call));
    }

    #[test]
    fn test_environment_proxy_by_scheme() {
        let env = env_from(&[
            ("HTTPS_PROXY", "secure-proxy:8443"),
            ("HTTP_PROXY", "http://plain-proxy:8080"),
        ]);
        let route = resolve_proxy(&ProxyCandidates::default(), &env, &api());
        assert_eq!(route.origin(), Some(ProxyOrigin::Environment));
        assert_eq!(
            route.proxy_url().unwrap().as_str(),
            "http://secure-proxy:8443/"
        );

        let plain = Url::parse("http://example.com/image.png").unwrap();
        let route = resolve_proxy(&ProxyCandidates::default(), &env, &plain);
        assert_eq!(route.proxy_url().unwrap().host_str(), Some("plain-proxy"));
    }

    #[test]
    fn test_all_proxy_fallback() {
        let env = env_from(&[("all_proxy", "socks5://fallback:1080")]);
        let route = resolve_proxy(&ProxyCandidates::default(), &env, &api());
        assert_eq!(route.proxy_url().unwrap().scheme(), "socks5");
    }

    #[test]
    fn test_no_proxy_and_loopback_are_direct() {
        let env = env_from(&[
            ("HTTPS_PROXY", "http://env:4"),
            ("NO_PROXY", "example.org, .tinify.com"),
        ]);
        let route = resolve_proxy(&ProxyCandidates::default(), &env, &api());
        assert_eq!(route, ProxyRoute::Direct);

        let local = Url::parse("https://127.0.0.1:9000/shrink").unwrap();
        let env = env_from(&[("HTTPS_PROXY", "http://env:4")]);
        assert_eq!(
            resolve_proxy(&ProxyCandidates::default(), &env, &local),
            ProxyRoute::Direct
        );
    }

    #[test]
    fn test_nothing_configured_is_direct() {
        let env = env_from(&[]);
        let route = resolve_proxy(&ProxyCandidates::default(), &env, &api());
        assert_eq!(route, ProxyRoute::Direct);
    }

    #[test]
    fn test_bypasses_proxy_rules() {
        assert!(bypasses_proxy("*", "anything.net", Some(443)));
        assert!(bypasses_proxy("tinify.com", "api.tinify.com", Some(443)));
        assert!(bypasses_proxy("api.tinify.com:443", "api.tinify.com", Some(443)));
        assert!(!bypasses_proxy("api.tinify.com:8443", "api.tinify.com", Some(443)));
        assert!(!bypasses_proxy("notinify.com", "tinify.com", Some(443)));
        assert!(!bypasses_proxy("", "tinify.com", Some(443)));
    }

    #[test]
    fn test_transport_reuses_clients_per_route() {
        let transport = Transport::new();
        transport.client_for(&ProxyRoute::Direct).unwrap();
        transport.client_for(&ProxyRoute::Direct).unwrap();
        assert_eq!(transport.pooled_routes(), 1);

        let via = ProxyRoute::Via {
            url: Url::parse("http://proxy.local:3128").unwrap(),
            origin: ProxyOrigin::Client,
        };
        transport.client_for(&via).unwrap();
        transport.client_for(&via).unwrap();
        assert_eq!(transport.pooled_routes(), 2);
    }
}
