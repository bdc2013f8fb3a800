//! Page-side orchestrator for the sandboxed analytics runtime.
//!
//! Renders the sandbox configuration, requests the sandbox runtime, boots the
//! analytics container and exposes a guarded event queue. Browser bindings
//! live in `web` and are only compiled for `wasm32`.

pub mod config;
pub mod data_layer;
pub mod document;
pub mod error;
pub mod page;
pub mod party_town;
pub mod render;
pub mod resolve;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{GtmSettings, PartyTownConfig, SandboxConfig};
pub use data_layer::DataLayer;
pub use document::{Document, ScriptElement};
pub use error::{OrchestratorError, Result};
pub use page::PageLocation;
pub use party_town::{InjectionState, PartyTown};
pub use resolve::UrlResolver;

/// Where the initializer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Browser,
    /// Pre-rendering; there is no live document to mutate.
    Server,
}

/// App-start hook: inject only in the browser and only when the sandbox is enabled.
///
/// Returns whether injection ran.
pub fn bootstrap<D: Document, Q: DataLayer>(
    party_town: &mut PartyTown<D, Q>,
    platform: Platform,
) -> Result<bool> {
    if platform != Platform::Browser {
        log::debug!("skipping injection outside the browser");
        return Ok(false);
    }
    let enabled = party_town
        .config()
        .is_some_and(|config| config.sandbox.enabled);
    if !enabled {
        log::debug!("sandbox disabled, nothing injected");
        return Ok(false);
    }

    party_town.inject_script()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HeadBuffer;
    use serde_json::Value;

    fn party_town(raw_settings: Option<&str>) -> PartyTown<HeadBuffer, Vec<Value>> {
        let page = PageLocation::parse("https://site.test/en/").unwrap();
        let pt = PartyTown::new(page, HeadBuffer::new(), Vec::new());
        match raw_settings {
            Some(raw) => pt.with_config(PartyTownConfig::from_json(raw, "en").unwrap()),
            None => pt,
        }
    }

    #[test]
    fn test_bootstrap_injects_in_browser() {
        let mut pt = party_town(Some(r#"{"partyTown":{"enabled":true}}"#));
        assert_eq!(bootstrap(&mut pt, Platform::Browser), Ok(true));
        assert!(pt.is_ready());
        assert_eq!(pt.document().scripts().len(), 2);
    }

    #[test]
    fn test_bootstrap_skips_server_rendering() {
        let mut pt = party_town(Some(r#"{"partyTown":{"enabled":true}}"#));
        assert_eq!(bootstrap(&mut pt, Platform::Server), Ok(false));
        assert_eq!(pt.state(), InjectionState::Uninitialized);
        assert!(pt.document().scripts().is_empty());
    }

    #[test]
    fn test_bootstrap_skips_disabled_sandbox() {
        let mut pt = party_town(Some(
            r#"{"partyTown":{"enabled":false},"gtm":{"enabled":true,"key":"GTM-TEST"}}"#,
        ));
        assert_eq!(bootstrap(&mut pt, Platform::Browser), Ok(false));
        assert!(pt.document().scripts().is_empty());
    }

    #[test]
    fn test_bootstrap_skips_missing_config() {
        let mut pt = party_town(None);
        assert_eq!(bootstrap(&mut pt, Platform::Browser), Ok(false));
        assert!(!pt.is_ready());
    }
}
