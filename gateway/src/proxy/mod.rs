use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use shared_types::PROXY_URL_PARAM;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{GatewayError, GatewayResult};
use crate::AppState;

/// Largest request body forwarded upstream (16 MiB).
const MAX_REQUEST_BODY: usize = 16 * 1024 * 1024;

/// Where a proxied request is sent, derived from its `url` parameter.
///
/// Only the embedded URL matters; the gateway's own mount path is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTarget {
    /// Scheme, host and non-default port, e.g. `https://example.com:8443`.
    pub origin: String,
    /// Path plus `?query` of the target. Fragments never leave the browser.
    pub path_with_query: String,
}

impl ForwardTarget {
    /// Extract and parse the `url` parameter from a raw query string.
    pub fn from_query(query: Option<&str>) -> GatewayResult<Self> {
        let raw = query
            .and_then(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .find(|(key, _)| key == PROXY_URL_PARAM)
                    .map(|(_, value)| value.into_owned())
            })
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| GatewayError::InvalidProxyTarget("missing url parameter".to_string()))?;

        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> GatewayResult<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| GatewayError::InvalidProxyTarget(format!("{raw}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(GatewayError::InvalidProxyTarget(format!(
                "{raw}: not an http(s) URL with a host"
            )));
        }

        let mut path_with_query = url.path().to_string();
        if let Some(query) = url.query().filter(|q| !q.is_empty()) {
            path_with_query.push('?');
            path_with_query.push_str(query);
        }

        Ok(Self {
            origin: url.origin().ascii_serialization(),
            path_with_query,
        })
    }

    pub fn upstream_url(&self) -> String {
        format!("{}{}", self.origin, self.path_with_query)
    }
}

/// `ANY {proxy_path}[/*]?url=<absolute-url>`: forward to the embedded target.
pub async fn forward(State(state): State<Arc<AppState>>, req: Request) -> GatewayResult<Response> {
    let target = match ForwardTarget::from_query(req.uri().query()) {
        Ok(t) => t,
        Err(e) => {
            warn!(uri = %req.uri(), error = %e, "rejected proxy request");
            return Err(e);
        }
    };

    let (parts, body) = req.into_parts();
    debug!(
        method = %parts.method,
        origin = %target.origin,
        path = %target.path_with_query,
        "forwarding proxied request"
    );

    let body_bytes = axum::body::to_bytes(body, MAX_REQUEST_BODY)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to read proxy request body");
            GatewayError::RequestBody(e.to_string())
        })?;

    let mut upstream_req = state
        .client
        .request(parts.method.clone(), target.upstream_url());
    upstream_req = copy_request_headers(upstream_req, &parts.headers, &target);
    if !body_bytes.is_empty() {
        upstream_req = upstream_req.body(body_bytes);
    }

    let upstream_res = upstream_req.send().await.map_err(|e| {
        error!(origin = %target.origin, path = %target.path_with_query, error = %e, "proxy upstream request failed");
        GatewayError::from_upstream(&target.origin, e)
    })?;

    let mut response = Response::new(Body::empty());
    *response.status_mut() = upstream_res.status();
    copy_response_headers(response.headers_mut(), upstream_res.headers());
    *response.body_mut() = Body::from_stream(upstream_res.bytes_stream());
    Ok(response)
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == header::CONNECTION
        || name.as_str().eq_ignore_ascii_case("proxy-connection")
        || name.as_str().eq_ignore_ascii_case("keep-alive")
        || name == header::TE
        || name == header::TRAILER
        || name == header::TRANSFER_ENCODING
        || name == header::UPGRADE
}

fn copy_request_headers(
    mut request: reqwest::RequestBuilder,
    headers: &HeaderMap,
    target: &ForwardTarget,
) -> reqwest::RequestBuilder {
    for (name, value) in headers {
        // Host and length are regenerated by the client for the target.
        if name == header::HOST || name == header::CONTENT_LENGTH || is_hop_by_hop(name) {
            continue;
        }
        if name == header::ORIGIN {
            if let Ok(origin) = HeaderValue::from_str(&target.origin) {
                request = request.header(header::ORIGIN, origin);
            }
            continue;
        }
        request = request.header(name, value);
    }
    request
}

fn copy_response_headers(dest: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        if is_hop_by_hop(name) {
            continue;
        }
        dest.append(name, value.clone());
    }
}
