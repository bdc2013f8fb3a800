//! Fixed templates for the two inline scripts.
//!
//! Only data flows into these strings; every interpolated value goes through
//! `serde_json` so it lands as a well-formed JS literal.

use serde_json::Value;
use shared_types::{DATA_LAYER_NAME, PROXY_URL_PARAM};

use crate::config::SandboxConfig;
use crate::resolve::UrlResolver;

fn js_literal<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| Value::Null.to_string())
}

/// The global `partytown` object read by the sandbox runtime on load.
///
/// `resolveUrl` is the browser-side twin of [`crate::resolve::resolve_url`].
pub fn render_sandbox_config(config: &SandboxConfig, resolver: &UrlResolver) -> String {
    format!(
        r#"partytown = {{
  lib: {lib},
  debug: {debug},
  forward: {forward},
  resolveUrl: function (url, location, type) {{
    var proxiedHosts = {hosts};
    if (proxiedHosts.indexOf(url.hostname) !== -1) {{
      var proxyUrl = new URL({endpoint});
      proxyUrl.searchParams.append({param}, url.href);
      return proxyUrl;
    }}
    return url;
  }}
}};"#,
        lib = js_literal(&config.lib_path),
        debug = config.debug,
        forward = js_literal(&config.forward_symbols),
        hosts = js_literal(resolver.proxied_hosts()),
        endpoint = js_literal(resolver.endpoint().as_str()),
        param = js_literal(PROXY_URL_PARAM),
    )
}

/// Analytics bootstrap: loads the container script for `container_key`.
///
/// The start marker is already queued by the orchestrator, so the snippet
/// only guarantees the queue exists before requesting `gtm.js`.
pub fn render_gtm_snippet(container_key: &str) -> String {
    format!(
        r#"(function (w, d, s, l, i) {{
  w[l] = w[l] || [];
  var f = d.getElementsByTagName(s)[0], j = d.createElement(s), dl = l != 'dataLayer' ? '&l=' + l : '';
  j.defer = true;
  j.src = 'https://www.googletagmanager.com/gtm.js?id=' + i + dl;
  f.parentNode.insertBefore(j, f);
}})(window, document, 'script', {layer}, {key});"#,
        layer = js_literal(DATA_LAYER_NAME),
        key = js_literal(container_key),
    )
}
