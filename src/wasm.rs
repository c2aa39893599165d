use wasm_bindgen::prelude::*;

use crate::model::CardDocument;

fn to_js_error(e: crate::CardError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub fn render_cards(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::render_json(json).map_err(to_js_error)
}

/// Render from a plain JS object instead of a JSON string.
#[wasm_bindgen]
pub fn render_cards_from_value(document: JsValue) -> Result<Vec<u8>, JsValue> {
    let document: CardDocument = serde_wasm_bindgen::from_value(document)?;
    crate::render(&document).map_err(to_js_error)
}

/// `on_progress` is called as `on_progress(percent, message)`.
#[wasm_bindgen]
pub fn render_cards_with_progress(json: &str, on_progress: &js_sys::Function) -> Result<Vec<u8>, JsValue> {
    let document: CardDocument = serde_json::from_str(json)
        .map_err(|e| to_js_error(e.into()))?;
    let mut reporter = |percent: f64, message: Option<&str>| {
        let message = message.map(JsValue::from_str).unwrap_or(JsValue::UNDEFINED);
        // Progress is fire-and-forget; a throwing callback doesn't stop the run.
        let _ = on_progress.call2(&JsValue::NULL, &JsValue::from_f64(percent), &message);
    };
    crate::render_with_progress(&document, &mut reporter).map_err(to_js_error)
}
