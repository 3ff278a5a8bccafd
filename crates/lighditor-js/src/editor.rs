//! Lighditor - the editor class exposed to JavaScript.

use lighditor_browser::{BrowserEditor, EditorConfig, EditorError, Selection};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Serialization failed: {}", e)))
}

fn editor_error(err: EditorError) -> JsError {
    JsError::new(&err.to_string())
}

fn parse_config(config: JsValue) -> Result<EditorConfig, EditorError> {
    if config.is_undefined() || config.is_null() {
        return Ok(EditorConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| EditorError::Config(e.to_string()))
}

/// The editor instance exposed to JavaScript.
#[wasm_bindgen]
pub struct Lighditor {
    inner: BrowserEditor,
}

#[wasm_bindgen]
impl Lighditor {
    /// Mount an editor on `element`.
    ///
    /// `config` is optional: `{ initTextContent, viewStartRow, viewableRows }`.
    #[wasm_bindgen(constructor)]
    pub fn new(element: Option<web_sys::Element>, config: JsValue) -> Result<Lighditor, JsError> {
        let config = parse_config(config).map_err(editor_error)?;
        let inner = BrowserEditor::mount(element.as_ref(), config).map_err(editor_error)?;
        Ok(Self { inner })
    }

    // === Content ===

    #[wasm_bindgen(js_name = setTextContent)]
    pub fn set_text_content(&self, text: &str) {
        self.inner.set_text_content(text);
    }

    #[wasm_bindgen(js_name = getTextContent)]
    pub fn get_text_content(&self) -> String {
        self.inner.text_content()
    }

    /// Rows inside the configured view window.
    #[wasm_bindgen(js_name = getViewRows)]
    pub fn get_view_rows(&self) -> Vec<String> {
        self.inner.view_rows()
    }

    // === Selection ===

    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&self, selection: JsValue) -> Result<(), JsError> {
        let selection: Selection = serde_wasm_bindgen::from_value(selection)
            .map_err(|e| JsError::new(&format!("Invalid selection: {}", e)))?;
        self.inner.set_selection(selection);
        Ok(())
    }

    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.selection())
    }

    #[wasm_bindgen(js_name = getCursorPosition)]
    pub fn get_cursor_position(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.cursor_position())
    }

    #[wasm_bindgen(js_name = getEditorState)]
    pub fn get_editor_state(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.state())
    }

    // === Callbacks ===

    /// Called as `callback(newText, oldText)` after each text change.
    #[wasm_bindgen(js_name = onTextContentChange)]
    pub fn on_text_content_change(&self, callback: js_sys::Function) {
        self.inner.on_text_content_change(move |new, old| {
            let result = callback.call2(
                &JsValue::NULL,
                &JsValue::from_str(new),
                &JsValue::from_str(old),
            );
            if let Err(e) = result {
                tracing::warn!("onTextContentChange callback threw: {:?}", e);
            }
        });
    }

    /// Called as `callback(newSelection, oldSelection)` after each selection
    /// change.
    #[wasm_bindgen(js_name = onSelectionChange)]
    pub fn on_selection_change(&self, callback: js_sys::Function) {
        self.inner.on_selection_change(move |new, old| {
            let (Ok(new), Ok(old)) = (to_js(new), to_js(old)) else {
                tracing::warn!("onSelectionChange: could not convert selection");
                return;
            };
            if let Err(e) = callback.call2(&JsValue::NULL, &new, &old) {
                tracing::warn!("onSelectionChange callback threw: {:?}", e);
            }
        });
    }

    // === Lifecycle ===

    /// Unmount and restore the original element. Returns false if already
    /// destroyed.
    pub fn destroy(&mut self) -> bool {
        self.inner.destroy()
    }
}
