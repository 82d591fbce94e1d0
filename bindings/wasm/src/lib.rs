//! Browser bindings for pymprims.
//!
//! Exposes `Parent`, `Child` and `InstanceRegistry` classes backed by a
//! [`WebHost`] over the live window. Each endpoint owns the closures it binds,
//! so `remove()` unbinds exactly what was bound.

mod child;
mod error;
mod host;
mod parent;
mod registry;

use wasm_bindgen::prelude::*;

pub use child::PymChild;
pub use host::WebHost;
pub use parent::PymParent;
pub use registry::PymRegistry;

/// Build a wire string.
#[wasm_bindgen(js_name = makeMessage)]
pub fn make_message(id: &str, message_type: &str, payload: &str) -> Result<String, JsError> {
    pymprims_wire::try_encode(id, message_type, payload)
        .map_err(|err| error::to_js_error("makeMessage failed", err))
}

/// Returns true if a child may ask the parent to navigate to `url`.
#[wasm_bindgen(js_name = isSafeUrl)]
pub fn is_safe_url(url: &str) -> bool {
    pymprims_wire::is_safe_url(url)
}
