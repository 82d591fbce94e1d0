use wasm_bindgen::JsError;

pub(crate) fn to_js_error(context: &str, err: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{context}: {err}"))
}

pub(crate) fn invalid_state(message: &str) -> JsError {
    JsError::new(message)
}
