//! Resolution of host-page settings into an immutable sandbox configuration.
//!
//! Every optional field falls back to the defaults in `shared_types`; the
//! locale is passed in explicitly instead of being looked up ambiently.

use std::collections::BTreeSet;

use shared_types::{
    DataLayerObject, GtmOptions, PartyTownSettings, SandboxSettings, DEFAULT_BASE_PATH,
    DEFAULT_FORWARD_SYMBOLS, DEFAULT_PROXIED_HOSTS, DEFAULT_PROXY_PATH, SANDBOX_LIB_FILE,
};

/// Sandbox runtime configuration, fixed for the lifetime of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Whether sandboxed execution is switched on at all.
    pub enabled: bool,
    /// Locale-prefixed directory of the runtime library, always ending in `/`.
    pub lib_path: String,
    pub debug: bool,
    /// Main-thread symbols whose calls are forwarded into the sandbox.
    pub forward_symbols: Vec<String>,
    /// Gateway mount path on the page's own origin.
    pub proxy_path: String,
    /// Hostnames whose requests are routed through the gateway.
    pub proxied_hosts: BTreeSet<String>,
}

impl SandboxConfig {
    /// `src` of the runtime library script.
    pub fn lib_script_src(&self) -> String {
        format!("{}{}", self.lib_path, SANDBOX_LIB_FILE)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GtmSettings {
    pub enabled: bool,
    pub container_key: String,
    pub initial_data_layer_props: DataLayerObject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartyTownConfig {
    pub sandbox: SandboxConfig,
    pub gtm: GtmSettings,
}

impl PartyTownConfig {
    /// Apply defaults to every unset field.
    pub fn resolve(settings: &PartyTownSettings, current_locale: &str) -> Self {
        let sandbox = settings.party_town.clone().unwrap_or_default();
        let gtm = settings.gtm.clone().unwrap_or_default();
        Self {
            sandbox: resolve_sandbox(sandbox, current_locale),
            gtm: resolve_gtm(gtm),
        }
    }

    pub fn from_json(raw: &str, current_locale: &str) -> Result<Self, serde_json::Error> {
        let settings = PartyTownSettings::from_json(raw)?;
        Ok(Self::resolve(&settings, current_locale))
    }
}

fn resolve_sandbox(settings: SandboxSettings, current_locale: &str) -> SandboxConfig {
    let locale = settings
        .locale
        .unwrap_or_else(|| current_locale.to_string());
    let base_path = settings
        .base_path
        .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());

    SandboxConfig {
        enabled: settings.enabled,
        lib_path: lib_path(&locale, &base_path),
        debug: settings.debug.unwrap_or(false),
        forward_symbols: settings
            .forward
            .unwrap_or_else(|| DEFAULT_FORWARD_SYMBOLS.iter().map(|s| s.to_string()).collect()),
        proxy_path: settings
            .proxy_uri
            .unwrap_or_else(|| DEFAULT_PROXY_PATH.to_string()),
        proxied_hosts: settings
            .proxied_hosts
            .map(|hosts| hosts.into_iter().collect())
            .unwrap_or_else(|| DEFAULT_PROXIED_HOSTS.iter().map(|s| s.to_string()).collect()),
    }
}

fn resolve_gtm(options: GtmOptions) -> GtmSettings {
    GtmSettings {
        enabled: options.enabled.unwrap_or(false),
        container_key: options.key.unwrap_or_default(),
        initial_data_layer_props: options.initial_data_layer_props.unwrap_or_default(),
    }
}

/// `/{locale}{base_path}/`, skipping empty segments so an unset locale
/// never yields a protocol-relative `//` path.
fn lib_path(locale: &str, base_path: &str) -> String {
    let segments: Vec<&str> = [locale, base_path]
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}/", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_for_unset_fields() {
        let settings = PartyTownSettings::from_json(r#"{"partyTown":{"enabled":true}}"#).unwrap();
        let config = PartyTownConfig::resolve(&settings, "en");

        assert!(config.sandbox.enabled);
        assert!(!config.sandbox.debug);
        assert_eq!(config.sandbox.lib_path, "/en/~partytown/");
        assert_eq!(config.sandbox.lib_script_src(), "/en/~partytown/partytown.js");
        assert_eq!(config.sandbox.forward_symbols, vec!["dataLayer.push", "fbq"]);
        assert_eq!(config.sandbox.proxy_path, "/gtm");
        assert_eq!(config.sandbox.proxied_hosts.len(), 4);
        assert!(config.sandbox.proxied_hosts.contains("googletagmanager.com"));
        assert!(config.sandbox.proxied_hosts.contains("region1.analytics.google.com"));

        assert!(!config.gtm.enabled);
        assert_eq!(config.gtm.container_key, "");
        assert!(config.gtm.initial_data_layer_props.is_empty());
    }

    #[test]
    fn test_explicit_values_win() {
        let raw = r#"{
            "partyTown": {
                "enabled": true,
                "debug": true,
                "basePath": "/lib/pt/",
                "locale": "de",
                "forward": ["gtag"],
                "proxyUri": "/proxy",
                "proxiedHosts": ["example.com", "example.com"]
            },
            "gtm": { "enabled": true, "key": "GTM-ABC", "initialDataLayerProps": { "page": "home" } }
        }"#;
        let config = PartyTownConfig::from_json(raw, "en").unwrap();

        assert!(config.sandbox.debug);
        assert_eq!(config.sandbox.lib_path, "/de/lib/pt/");
        assert_eq!(config.sandbox.forward_symbols, vec!["gtag"]);
        assert_eq!(config.sandbox.proxy_path, "/proxy");
        assert_eq!(
            config.sandbox.proxied_hosts,
            BTreeSet::from(["example.com".to_string()])
        );
        assert!(config.gtm.enabled);
        assert_eq!(config.gtm.container_key, "GTM-ABC");
        assert_eq!(config.gtm.initial_data_layer_props["page"], "home");
    }

    #[test]
    fn test_missing_sections_resolve_to_disabled_defaults() {
        let config = PartyTownConfig::resolve(&PartyTownSettings::default(), "fr");
        assert!(!config.sandbox.enabled);
        assert_eq!(config.sandbox.lib_path, "/fr/~partytown/");
        assert!(!config.gtm.enabled);
    }

    #[test]
    fn test_empty_proxied_hosts_stay_empty() {
        let settings = PartyTownSettings::from_json(
            r#"{"partyTown":{"enabled":true,"proxiedHosts":[]}}"#,
        )
        .unwrap();
        let config = PartyTownConfig::resolve(&settings, "en");
        assert!(config.sandbox.proxied_hosts.is_empty());
    }

    #[test]
    fn test_lib_path_skips_empty_locale() {
        assert_eq!(lib_path("", "/~partytown"), "/~partytown/");
        assert_eq!(lib_path("en", ""), "/en/");
        assert_eq!(lib_path("", ""), "/");
        assert_eq!(lib_path("/en-US/", "~partytown"), "/en-US/~partytown/");
    }
}
