//! Injection sequencing and the guarded event-queue API.
//!
//! `inject_script` emits, in order:
//! 1. the inline sandbox configuration (must exist before the runtime loads)
//! 2. the sandbox runtime library
//! 3. when analytics is enabled: the start marker and the initial property
//!    snapshot are queued, then the analytics snippet is appended
//!
//! Only after that does `gtag` accept events.

use serde_json::Value;
use shared_types::{DataLayerObject, PLAIN_SCRIPT_TYPE, SANDBOXED_SCRIPT_TYPE};

use crate::config::PartyTownConfig;
use crate::data_layer::{gtm_start_marker, merge_data_layer_props, DataLayer};
use crate::document::{Document, ScriptElement};
use crate::error::{OrchestratorError, Result};
use crate::page::PageLocation;
use crate::render::{render_gtm_snippet, render_sandbox_config};
use crate::resolve::UrlResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    Uninitialized,
    /// Scripts are being appended. Stays here if a document mutation fails.
    Injecting,
    Ready,
}

pub struct PartyTown<D: Document, Q: DataLayer> {
    config: Option<PartyTownConfig>,
    page: PageLocation,
    document: D,
    data_layer: Q,
    state: InjectionState,
    last_props: DataLayerObject,
}

impl<D: Document, Q: DataLayer> PartyTown<D, Q> {
    pub fn new(page: PageLocation, document: D, data_layer: Q) -> Self {
        Self {
            config: None,
            page,
            document,
            data_layer,
            state: InjectionState::Uninitialized,
            last_props: DataLayerObject::new(),
        }
    }

    pub fn with_config(mut self, config: PartyTownConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config(&self) -> Option<&PartyTownConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> InjectionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == InjectionState::Ready
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn data_layer(&self) -> &Q {
        &self.data_layer
    }

    /// Append the sandbox and analytics scripts to the document head.
    ///
    /// Meant to run once per page load; repeated calls are not deduplicated.
    pub fn inject_script(&mut self) -> Result<()> {
        let Some(config) = self.config.as_ref() else {
            return Err(OrchestratorError::ConfigurationMissing);
        };
        self.state = InjectionState::Injecting;

        let sandbox = &config.sandbox;
        let resolver = UrlResolver::new(
            &self.page.origin(),
            &sandbox.proxy_path,
            sandbox.proxied_hosts.clone(),
        )?;

        self.document
            .append_to_head(&ScriptElement::inline(render_sandbox_config(sandbox, &resolver)))?;
        log::debug!("sandbox config appended, proxy endpoint {}", resolver.endpoint());

        self.document
            .append_to_head(&ScriptElement::external(sandbox.lib_script_src()))?;
        log::debug!("sandbox runtime requested from {}", sandbox.lib_script_src());

        let gtm = &config.gtm;
        if gtm.enabled {
            self.data_layer.ensure()?;
            self.data_layer
                .push(gtm_start_marker(chrono::Utc::now().timestamp_millis()))?;

            let snapshot = merge_data_layer_props(&self.last_props, &gtm.initial_data_layer_props);
            self.data_layer.push(Value::Object(snapshot.clone()))?;
            self.last_props = snapshot;

            // Debug tooling inspects the live main-thread queue, so it must not run sandboxed.
            let debug_mode = self.page.is_gtm_debug();
            let script_type = if debug_mode || !sandbox.enabled {
                PLAIN_SCRIPT_TYPE
            } else {
                SANDBOXED_SCRIPT_TYPE
            };
            let snippet = ScriptElement::inline(render_gtm_snippet(&gtm.container_key))
                .with_type(script_type)
                .with_cross_origin("anonymous");
            self.document.append_to_head(&snippet)?;
            log::debug!(
                "analytics snippet for {} appended as {script_type}",
                gtm.container_key
            );
        }

        self.state = InjectionState::Ready;
        Ok(())
    }

    /// Queue an event verbatim. Fails until `inject_script` has completed.
    pub fn gtag(&mut self, event: Value) -> Result<()> {
        self.with_ready_queue(|queue| queue.push(event))
    }

    /// Queue a new property snapshot merged onto the previous one.
    pub fn update_data_layer_props(&mut self, props: &DataLayerObject) -> Result<()> {
        let snapshot = merge_data_layer_props(&self.last_props, props);
        self.with_ready_queue(|queue| queue.push(Value::Object(snapshot.clone())))?;
        self.last_props = snapshot;
        Ok(())
    }

    /// Run `f` against the event queue once injection has completed.
    ///
    /// The queue is created first if the page has none, which happens when
    /// analytics is disabled and injection never touched it.
    pub fn with_ready_queue<T>(&mut self, f: impl FnOnce(&mut Q) -> Result<T>) -> Result<T> {
        self.check_ready()?;
        self.data_layer.ensure()?;
        f(&mut self.data_layer)
    }

    fn check_ready(&self) -> Result<()> {
        if self.state != InjectionState::Ready {
            log::warn!("analytics queue used before injectScript() completed");
            return Err(OrchestratorError::NotInitialized);
        }
        Ok(())
    }
}
