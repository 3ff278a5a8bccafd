//! Selection capability detection.

use js_sys::Reflect;
use lighditor_core::Capabilities;
use wasm_bindgen::JsValue;

fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

/// Probe the current window for the selection and range APIs.
///
/// Returns `Capabilities::NONE` outside a window context (e.g. a worker).
pub fn capabilities() -> Capabilities {
    let Some(window) = web_sys::window() else {
        return Capabilities::NONE;
    };
    let get_selection = has_property(&window, "getSelection");
    let create_range = window
        .document()
        .map(|document| has_property(&document, "createRange"))
        .unwrap_or(false);

    let caps = Capabilities {
        get_selection,
        create_range,
    };
    if !caps.supports_selection() {
        tracing::warn!(?caps, "selection APIs missing, cursor will not be restored");
    }
    caps
}
