//! Contract shared by the gateway and the orchestrator
//!
//! The two halves never call each other. They agree only on:
//! - the path the gateway is mounted on and the name of its target parameter
//! - the hostnames the orchestrator is allowed to route through it
//! - the settings shape the host page hands to the orchestrator
//!
//! Serializable with serde for the JSON the host page provides.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Gateway contract
// ============================================================================

/// Path the gateway is mounted on unless configured otherwise.
pub const DEFAULT_PROXY_PATH: &str = "/gtm";

/// Query parameter carrying the absolute target URL.
pub const PROXY_URL_PARAM: &str = "url";

/// Body of the 400 returned for a missing or unusable target.
pub const MISSING_URL_MESSAGE: &str = "Missing url parameter";

/// Hostnames routed through the gateway when no allow-list is configured.
pub const DEFAULT_PROXIED_HOSTS: &[&str] = &[
    "region1.analytics.google.com",
    "googletagmanager.com",
    "connect.facebook.net",
    "googleads.g.doubleclick.net",
];

// ============================================================================
// Sandbox runtime defaults
// ============================================================================

pub const DEFAULT_BASE_PATH: &str = "/~partytown";

/// Main-thread symbols the sandbox forwards calls for.
pub const DEFAULT_FORWARD_SYMBOLS: &[&str] = &["dataLayer.push", "fbq"];

/// File name of the sandbox runtime inside the lib directory.
pub const SANDBOX_LIB_FILE: &str = "partytown.js";

/// Script type that hands a script to the sandbox instead of the main thread.
pub const SANDBOXED_SCRIPT_TYPE: &str = "text/partytown";

/// Script type for ordinary main-thread execution.
pub const PLAIN_SCRIPT_TYPE: &str = "text/javascript";

// ============================================================================
// Analytics
// ============================================================================

/// Name of the global event queue the analytics snippet reads.
pub const DATA_LAYER_NAME: &str = "dataLayer";

/// Page query flag set by the tag assistant when debugging a container.
pub const GTM_DEBUG_QUERY_FLAG: &str = "gtm_debug";

pub const GTM_START_EVENT: &str = "gtm.js";

/// One entry of the data-layer queue: a JSON object of string/number/null/object values.
pub type DataLayerObject = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Settings input
// ============================================================================

/// Settings supplied by the host page's configuration loader.
///
/// Every field except `partyTown.enabled` is optional; the orchestrator
/// resolves missing values against the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../orchestrator/bindings/settings.ts")]
pub struct PartyTownSettings {
    #[serde(default)]
    pub party_town: Option<SandboxSettings>,
    #[serde(default)]
    pub gtm: Option<GtmOptions>,
}

impl PartyTownSettings {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../orchestrator/bindings/settings.ts")]
pub struct SandboxSettings {
    pub enabled: bool,
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub base_path: Option<String>,
    /// Path prefix for i18n builds; the current locale when absent.
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub forward: Option<Vec<String>>,
    #[serde(default)]
    pub proxy_uri: Option<String>,
    #[serde(default)]
    pub proxied_hosts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../orchestrator/bindings/settings.ts")]
pub struct GtmOptions {
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Container id, e.g. `GTM-XXXXXXX`.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub initial_data_layer_props: Option<DataLayerObject>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_rs::Config;

    #[test]
    fn test_settings_parse_camel_case() {
        let raw = r#"{
            "partyTown": { "enabled": true, "proxyUri": "/proxy", "proxiedHosts": ["example.com"] },
            "gtm": { "enabled": true, "key": "GTM-TEST", "initialDataLayerProps": { "page": "home", "user": null } }
        }"#;

        let settings = PartyTownSettings::from_json(raw).unwrap();
        let party_town = settings.party_town.as_ref().unwrap();
        assert!(party_town.enabled);
        assert_eq!(party_town.proxy_uri.as_deref(), Some("/proxy"));
        assert_eq!(party_town.proxied_hosts, Some(vec!["example.com".to_string()]));
        assert_eq!(party_town.debug, None);

        let gtm = settings.gtm.as_ref().unwrap();
        assert_eq!(gtm.key.as_deref(), Some("GTM-TEST"));
        let props = gtm.initial_data_layer_props.as_ref().unwrap();
        assert_eq!(props["page"], "home");
        assert!(props["user"].is_null());
    }

    #[test]
    fn test_empty_settings_disable_sandbox() {
        let settings = PartyTownSettings::from_json("{}").unwrap();
        assert_eq!(settings, PartyTownSettings::default());
        assert!(settings.party_town.is_none());
    }

    #[test]
    fn test_enabled_is_required() {
        let err = PartyTownSettings::from_json(r#"{"partyTown":{"debug":true}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_default_proxy_path_is_absolute() {
        assert!(DEFAULT_PROXY_PATH.starts_with('/'));
        assert!(!DEFAULT_PROXY_PATH.ends_with('/'));
    }

    #[test]
    fn export_types() {
        // The export_to attribute in each type's #[ts] macro specifies the output file
        let config = Config::default();
        PartyTownSettings::export(&config).unwrap();
        SandboxSettings::export(&config).unwrap();
        GtmOptions::export(&config).unwrap();
    }
}
