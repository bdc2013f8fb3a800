//! Browser bindings: the live `<head>`, `window.dataLayer` and the JS entry point.

use std::sync::Once;

use js_sys::{Array, Function, Reflect, JSON};
use serde_json::Value;
use shared_types::{DataLayerObject, DATA_LAYER_NAME};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::data_layer::DataLayer;
use crate::document::{Document, ScriptElement};
use crate::error::{OrchestratorError, Result};
use crate::page::PageLocation;
use crate::party_town::PartyTown;
use crate::{bootstrap, PartyTownConfig, Platform};

static LOGGER: Once = Once::new();

fn describe(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn window() -> std::result::Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window` exists"))
}

pub struct BrowserDocument {
    document: web_sys::Document,
}

impl BrowserDocument {
    pub fn new(window: &Window) -> std::result::Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document unavailable"))?;
        Ok(Self { document })
    }

    fn build(&self, script: &ScriptElement) -> std::result::Result<HtmlScriptElement, JsValue> {
        let element = self
            .document
            .create_element("script")?
            .dyn_into::<HtmlScriptElement>()?;
        if let Some(script_type) = &script.script_type {
            element.set_type(script_type);
        }
        if let Some(src) = &script.src {
            element.set_src(src);
        }
        if let Some(cross_origin) = &script.cross_origin {
            element.set_cross_origin(Some(cross_origin.as_str()));
        }
        if let Some(text) = &script.text {
            element.set_text_content(Some(text.as_str()));
        }
        Ok(element)
    }
}

impl Document for BrowserDocument {
    fn append_to_head(&mut self, script: &ScriptElement) -> Result<()> {
        let head = self
            .document
            .head()
            .ok_or_else(|| OrchestratorError::Document("document has no <head>".to_string()))?;
        let element = self
            .build(script)
            .map_err(|err| OrchestratorError::Document(describe(err)))?;
        head.append_child(&element)
            .map_err(|err| OrchestratorError::Document(describe(err)))?;
        Ok(())
    }
}

/// `window.dataLayer`, shared with whatever else on the page already uses it.
pub struct WindowDataLayer {
    window: Window,
}

impl WindowDataLayer {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn queue(&self) -> std::result::Result<JsValue, JsValue> {
        Reflect::get(&self.window, &JsValue::from_str(DATA_LAYER_NAME))
    }

    /// Push a JS value as-is, function-valued fields such as `eventCallback` included.
    pub fn push_js(&mut self, entry: &JsValue) -> Result<()> {
        let push_entry = || -> std::result::Result<(), JsValue> {
            let queue = self.queue()?;
            // The container replaces `push` once loaded; call whatever is installed.
            let push = Reflect::get(&queue, &JsValue::from_str("push"))?.dyn_into::<Function>()?;
            push.call1(&queue, entry)?;
            Ok(())
        };
        push_entry().map_err(|err| OrchestratorError::DataLayer(describe(err)))
    }
}

impl DataLayer for WindowDataLayer {
    fn ensure(&mut self) -> Result<()> {
        let current = self
            .queue()
            .map_err(|err| OrchestratorError::DataLayer(describe(err)))?;
        if Array::is_array(&current) {
            return Ok(());
        }
        Reflect::set(&self.window, &JsValue::from_str(DATA_LAYER_NAME), &Array::new())
            .map_err(|err| OrchestratorError::DataLayer(describe(err)))?;
        Ok(())
    }

    fn push(&mut self, entry: Value) -> Result<()> {
        let raw = serde_json::to_string(&entry)
            .map_err(|err| OrchestratorError::DataLayer(err.to_string()))?;
        let entry = JSON::parse(&raw).map_err(|err| OrchestratorError::DataLayer(describe(err)))?;
        self.push_js(&entry)
    }
}

fn from_js(value: &JsValue) -> std::result::Result<Value, JsValue> {
    // `JSON.stringify(undefined)` yields `undefined`, not a string.
    let raw = JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("value is not JSON-serializable"))?;
    serde_json::from_str(&raw).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn to_js(err: OrchestratorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct PartyTownHandle {
    inner: PartyTown<BrowserDocument, WindowDataLayer>,
}

#[wasm_bindgen]
impl PartyTownHandle {
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    pub fn gtag(&mut self, event: JsValue) -> std::result::Result<(), JsValue> {
        self.inner
            .with_ready_queue(|queue| queue.push_js(&event))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = updateDataLayerProps)]
    pub fn update_data_layer_props(&mut self, props: JsValue) -> std::result::Result<(), JsValue> {
        let props: DataLayerObject = match from_js(&props)? {
            Value::Object(props) => props,
            other => {
                return Err(JsValue::from_str(&format!(
                    "data layer props must be an object, got {other}"
                )))
            }
        };
        self.inner.update_data_layer_props(&props).map_err(to_js)
    }
}

/// Resolve settings against the current page and inject when the sandbox is enabled.
#[wasm_bindgen(js_name = providePartyTown)]
pub fn provide_party_town(
    settings_json: &str,
    locale: &str,
) -> std::result::Result<PartyTownHandle, JsValue> {
    LOGGER.call_once(|| wasm_logger::init(wasm_logger::Config::default()));

    let config = PartyTownConfig::from_json(settings_json, locale)
        .map_err(|err| JsValue::from_str(&format!("invalid PartyTown settings: {err}")))?;

    let window = window()?;
    let page = PageLocation::parse(&window.location().href()?).map_err(to_js)?;
    let document = BrowserDocument::new(&window)?;

    let mut inner = PartyTown::new(page, document, WindowDataLayer::new(window)).with_config(config);
    let injected = bootstrap(&mut inner, Platform::Browser).map_err(to_js)?;
    log::info!("PartyTown provided, injected: {injected}");

    Ok(PartyTownHandle { inner })
}
