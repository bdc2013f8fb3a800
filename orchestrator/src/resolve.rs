//! The sandbox's `resolveUrl` hook as a pure function.
//!
//! Only allow-listed hostnames are rewritten to the gateway; everything else
//! passes through untouched, so the gateway never becomes an open relay for
//! arbitrary domains.

use std::collections::BTreeSet;

use shared_types::PROXY_URL_PARAM;
use url::Url;

use crate::error::{OrchestratorError, Result};

/// Absolute gateway endpoint for a page: `{origin}{proxy_path}`.
pub fn proxy_endpoint(origin: &str, proxy_path: &str) -> Result<Url> {
    let raw = format!("{origin}{proxy_path}");
    Url::parse(&raw).map_err(|_| OrchestratorError::InvalidProxyEndpoint(raw))
}

/// Route `url` through the gateway when its hostname is allow-listed.
///
/// The match is exact against the parsed (lower-cased) hostname; subdomains of
/// an allow-listed host are not included.
pub fn resolve_url(url: &Url, proxied_hosts: &BTreeSet<String>, endpoint: &Url) -> Url {
    let proxied = url
        .host_str()
        .is_some_and(|host| proxied_hosts.contains(host));
    if !proxied {
        return url.clone();
    }

    let mut proxy_url = endpoint.clone();
    proxy_url
        .query_pairs_mut()
        .append_pair(PROXY_URL_PARAM, url.as_str());
    proxy_url
}

/// [`resolve_url`] bound to one page's endpoint and allow-list.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    endpoint: Url,
    proxied_hosts: BTreeSet<String>,
}

impl UrlResolver {
    pub fn new(origin: &str, proxy_path: &str, proxied_hosts: BTreeSet<String>) -> Result<Self> {
        Ok(Self {
            endpoint: proxy_endpoint(origin, proxy_path)?,
            proxied_hosts,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn proxied_hosts(&self) -> &BTreeSet<String> {
        &self.proxied_hosts
    }

    pub fn resolve(&self, url: &Url) -> Url {
        resolve_url(url, &self.proxied_hosts, &self.endpoint)
    }
}
